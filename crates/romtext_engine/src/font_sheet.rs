use std::{fmt, path::Path, sync::Arc};

use image::RgbaImage;

use crate::{EngineError, Result};

/// A decoded font sheet image with a content derived identity.
///
/// Two sheets with equal pixels share an identity, so re-uploading the same
/// file keeps its cached glyph metrics.
#[derive(Clone)]
pub struct FontSheet {
    image: Arc<RgbaImage>,
    identity: u32,
}

impl fmt::Debug for FontSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSheet")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("identity", &format_args!("{:08x}", self.identity))
            .finish()
    }
}

impl PartialEq for FontSheet {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && self.image.dimensions() == other.image.dimensions()
    }
}

impl FontSheet {
    pub fn new(image: RgbaImage) -> Self {
        let identity = image_identity(&image);
        Self {
            image: Arc::new(image),
            identity,
        }
    }

    /// Decodes PNG, JPEG, GIF or any other format `image` recognizes.
    ///
    /// # Errors
    ///
    /// Fails on unknown formats, corrupt data and zero sized images.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(EngineError::InvalidImageSource {
                message: "image has no pixels".to_string(),
            });
        }
        Ok(Self::new(image))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| EngineError::read_file(path, e.to_string()))?;
        Self::decode(&bytes)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn identity(&self) -> u32 {
        self.identity
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

pub(crate) fn image_identity(image: &RgbaImage) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&image.width().to_le_bytes());
    hasher.update(&image.height().to_le_bytes());
    hasher.update(image.as_raw());
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_identity_follows_content() {
        let a = FontSheet::new(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        let b = FontSheet::new(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        let c = FontSheet::new(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 4, 255])));
        let d = FontSheet::new(RgbaImage::from_pixel(2, 8, Rgba([1, 2, 3, 255])));
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_ne!(a.identity(), d.identity());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(FontSheet::decode(b"not an image").is_err());
    }

    #[test]
    fn test_decode_png() {
        let mut bytes = Vec::new();
        let image = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255]));
        image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        let sheet = FontSheet::decode(&bytes).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (3, 2));
        assert_eq!(sheet.image().get_pixel(2, 1), &Rgba([9, 8, 7, 255]));
    }
}
