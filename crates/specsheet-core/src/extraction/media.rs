use std::io::Cursor;

use image::{ImageError, ImageFormat, ImageReader};

/// What could be learned about an embedded media part without decoding pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Inspect image bytes: format from magic bytes, dimensions from the header.
///
/// Vector formats the image crate does not know (EMF, WMF, SVG) are accepted
/// with a MIME type from the extension and no dimensions. Bytes that claim a
/// raster format but cannot be read are an error; the caller skips them.
pub fn inspect(bytes: &[u8], path: &str) -> Result<MediaInfo, String> {
    if bytes.is_empty() {
        return Err("image part is empty".to_string());
    }

    let Ok(format) = image::guess_format(bytes) else {
        return mime_from_extension(path)
            .map(|mime| MediaInfo {
                mime_type: mime.to_string(),
                width: None,
                height: None,
            })
            .ok_or_else(|| "unrecognized image data".to_string());
    };

    let mime_type = format.to_mime_type().to_string();
    match dimensions(bytes, format) {
        Ok((w, h)) => Ok(MediaInfo {
            mime_type,
            width: Some(w),
            height: Some(h),
        }),
        Err(ImageError::Unsupported(_)) => Ok(MediaInfo {
            mime_type,
            width: None,
            height: None,
        }),
        Err(e) => Err(format!("image stream could not be decoded: {e}")),
    }
}

fn dimensions(bytes: &[u8], format: ImageFormat) -> Result<(u32, u32), ImageError> {
    ImageReader::with_format(Cursor::new(bytes), format).into_dimensions()
}

/// MIME type for formats recognized only by extension.
fn mime_from_extension(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "emf" => Some("image/emf"),
        "wmf" => Some("image/wmf"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
