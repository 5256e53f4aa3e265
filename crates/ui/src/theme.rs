use img_viewer_protocol::ThemeToken;

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    match mode {
        ThemeMode::Light => resolve_light(token),
        ThemeMode::Dark => resolve_dark(token),
    }
    .to_color32()
}

fn resolve_light(token: ThemeToken) -> ResolvedColor {
    match token {
        ThemeToken::Background => ResolvedColor::rgb(0xff, 0xff, 0xff),
    }
}

fn resolve_dark(token: ThemeToken) -> ResolvedColor {
    // Catppuccin Mocha
    match token {
        ThemeToken::Background => ResolvedColor::rgb(0x1e, 0x1e, 0x2e), // Base
    }
}
