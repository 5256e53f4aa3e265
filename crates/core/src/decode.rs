use image::RgbaImage;
use img_viewer_protocol::Size;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no image data")]
    Empty,
    #[error("malformed or unsupported image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has zero width or height")]
    ZeroSized,
    #[error("pixel buffer does not hold {width}x{height} RGBA pixels")]
    BufferSize { width: u32, height: u32 },
}

/// An image decoded to 8-bit RGBA, ready for texture upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    /// Wrap raw RGBA bytes (row-major, 4 bytes per pixel).
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::ZeroSized);
        }
        let pixels = RgbaImage::from_raw(width, height, data)
            .ok_or(DecodeError::BufferSize { width, height })?;
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Native size in pixels.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

/// Turns encoded image bytes into pixels.
pub trait Decoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;
}

/// Decoder backed by the `image` crate; the format is sniffed from the
/// leading bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl Decoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let pixels = image::load_from_memory(bytes)?.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(DecodeError::ZeroSized);
        }
        Ok(DecodedImage { pixels })
    }
}
