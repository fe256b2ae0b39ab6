/// Offscreen raster surface for snapshots
///
/// Turns a video frame into an image data URI the UI can download or share.

use crate::error::{Result, TryOnError};
use crate::session::media::Frame;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ColorType, ImageFormat};
use std::io::Cursor;

/// Draws frames and encodes them
pub trait FrameSink: Send + Sync {
    /// Encode `frame` at its native size as a `data:` URI
    fn encode(&self, frame: &Frame) -> Result<String>;
}

/// PNG + base64, like a canvas `toDataURL("image/png")`
#[derive(Debug, Default, Clone, Copy)]
pub struct PngFrameSink;

impl FrameSink for PngFrameSink {
    fn encode(&self, frame: &Frame) -> Result<String> {
        if frame.width == 0 || frame.height == 0 {
            return Err(TryOnError::Encoding("frame has no pixels".to_string()));
        }

        if !frame.is_consistent() {
            return Err(TryOnError::Encoding(format!(
                "frame buffer is {} bytes, expected {}x{}x4",
                frame.rgba.len(),
                frame.width,
                frame.height
            )));
        }

        let mut png = Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut png,
            &frame.rgba,
            frame.width,
            frame.height,
            ColorType::Rgba8,
            ImageFormat::Png,
        )
        .map_err(|e| TryOnError::Encoding(e.to_string()))?;

        Ok(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(png.into_inner())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_data_uri() {
        let uri = PngFrameSink.encode(&Frame::blank(4, 3)).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let payload = uri.trim_start_matches("data:image/png;base64,");
        let bytes = STANDARD.decode(payload).unwrap();
        // PNG signature
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_mismatched_buffer_rejected() {
        let frame = Frame {
            width: 4,
            height: 4,
            rgba: vec![0; 10],
        };
        assert!(matches!(
            PngFrameSink.encode(&frame),
            Err(TryOnError::Encoding(_))
        ));
    }

    #[test]
    fn test_empty_frame_rejected() {
        assert!(PngFrameSink.encode(&Frame::blank(0, 0)).is_err());
    }
}
