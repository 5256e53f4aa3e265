use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use img_viewer_core::{Decoder, Viewer, ViewerConfig};
use img_viewer_protocol::InputEvent;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};
use tracing::{info, warn};

use crate::canvas::{TerminalBackend, canvas_for};

const FRAME: Duration = Duration::from_millis(16);

/// What a terminal event means for the viewer.
#[derive(Debug, PartialEq)]
pub enum Action {
    Input(Vec<InputEvent>),
    Resize { cols: u16, rows: u16 },
    Quit,
    Ignore,
}

/// Map one crossterm event. Mouse rows are doubled because each cell holds
/// two canvas pixels; row 0 is the status line and is skipped.
pub fn translate(event: &Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('+') | KeyCode::Char('=') => {
                Action::Input(vec![InputEvent::Wheel { delta_y: 1.0 }])
            }
            KeyCode::Char('-') => Action::Input(vec![InputEvent::Wheel { delta_y: -1.0 }]),
            _ => Action::Ignore,
        },
        Event::Mouse(mouse) => Action::Input(translate_mouse(mouse)),
        Event::Resize(cols, rows) => Action::Resize {
            cols: *cols,
            rows: *rows,
        },
        _ => Action::Ignore,
    }
}

fn translate_mouse(mouse: &MouseEvent) -> Vec<InputEvent> {
    let at = InputEvent::PointerMove {
        x: f64::from(mouse.column),
        y: f64::from(mouse.row.saturating_sub(1)) * 2.0,
    };
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => vec![at],
        MouseEventKind::Down(_) => vec![at, InputEvent::mouse_down()],
        MouseEventKind::Up(_) => vec![at, InputEvent::PointerUp],
        MouseEventKind::ScrollUp => vec![at, InputEvent::Wheel { delta_y: 1.0 }],
        MouseEventKind::ScrollDown => vec![at, InputEvent::Wheel { delta_y: -1.0 }],
        MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => Vec::new(),
    }
}

/// Run one viewer frame. A rejected canvas (a terminal too small to draw
/// in) is not fatal; the message is returned for the status line.
fn advance<D: Decoder>(
    viewer: &mut Viewer<TerminalBackend, D>,
    events: &[InputEvent],
) -> Option<String> {
    match viewer.tick(events) {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, "frame skipped");
            Some(e.to_string())
        }
    }
}

pub fn run_tui(source: &str, bytes: &[u8], config: ViewerConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, source, bytes, config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    source: &str,
    bytes: &[u8],
    config: ViewerConfig,
) -> Result<()> {
    let area = terminal.size()?;
    let mut viewer = Viewer::new(
        TerminalBackend,
        canvas_for(area.width, area.height.saturating_sub(1)),
        config,
    )?;
    viewer.load_image(bytes)?;
    info!(source, "viewing");
    let notifier = viewer.notifier();

    loop {
        let mut events = Vec::new();
        let mut timeout = FRAME;
        while event::poll(timeout)? {
            match translate(&event::read()?) {
                Action::Quit => return Ok(()),
                Action::Input(input) => events.extend(input),
                Action::Resize { cols, rows } => {
                    notifier.resize(canvas_for(cols, rows.saturating_sub(1)));
                }
                Action::Ignore => {}
            }
            timeout = Duration::ZERO;
        }

        let problem = advance(&mut viewer, &events);

        let zoom = viewer.viewport().zoom_level;
        terminal.draw(|frame| {
            let area = frame.area();
            let text = match &problem {
                Some(problem) => format!(" {source} | {problem} | q quit "),
                None => format!(
                    " {source} | {:.0}% | drag pan | scroll or +/- zoom | q quit ",
                    zoom * 100.0
                ),
            };
            let status = Paragraph::new(text)
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(status, Rect::new(0, 0, area.width, 1));
            viewer.renderer().paint(frame.buffer_mut(), 1);
        })?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers, MouseButton};
    use img_viewer_core::{DecodeError, DecodedImage, Interaction};

    /// Every input becomes a 2x2 opaque image.
    struct RawDecoder;

    impl Decoder for RawDecoder {
        fn decode(&self, _bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
            DecodedImage::from_rgba(2, 2, vec![255; 16])
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn press_positions_pointer_first() {
        assert_eq!(
            translate(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 5)),
            Action::Input(vec![
                InputEvent::PointerMove { x: 10.0, y: 8.0 },
                InputEvent::mouse_down(),
            ])
        );
    }

    #[test]
    fn scroll_zooms() {
        let Action::Input(events) = translate(&mouse(MouseEventKind::ScrollDown, 0, 1)) else {
            panic!("expected input");
        };
        assert_eq!(events[1], InputEvent::Wheel { delta_y: -1.0 });
    }

    #[test]
    fn keys() {
        let key = |c| Event::Key(KeyEvent::new(c, KeyModifiers::NONE));
        assert_eq!(translate(&key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            translate(&key(KeyCode::Char('+'))),
            Action::Input(vec![InputEvent::Wheel { delta_y: 1.0 }])
        );
        assert_eq!(translate(&key(KeyCode::Char('x'))), Action::Ignore);
    }

    #[test]
    fn one_row_terminal_does_not_stop_the_viewer() {
        let mut viewer = Viewer::with_decoder(
            TerminalBackend,
            RawDecoder,
            canvas_for(80, 23),
            ViewerConfig::default(),
        )
        .unwrap();
        viewer.load_image(&[0; 16]).unwrap();

        viewer.notifier().resize(canvas_for(80, 0));
        let problem = advance(&mut viewer, &[InputEvent::mouse_down()]);
        assert!(problem.is_some_and(|p| p.contains("not drawable")));
        assert_eq!(viewer.viewport().canvas, canvas_for(80, 23));
        assert!(viewer.gesture().flags.contains(Interaction::Panning));

        viewer.notifier().resize(canvas_for(80, 23));
        assert_eq!(advance(&mut viewer, &[InputEvent::PointerUp]), None);
        assert!(viewer.gesture().flags.is_empty());
    }

    #[test]
    fn resize_is_forwarded() {
        assert_eq!(
            translate(&Event::Resize(100, 30)),
            Action::Resize {
                cols: 100,
                rows: 30
            }
        );
    }
}
