//! Session cache: URL -> decoded image, plus the per-URL error map

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Reason recorded when bytes arrive but cannot be decoded
pub const UNDECODABLE: &str = "Unsupported format or corrupted data";

/// Reason recorded when a fetch succeeds with no body
pub const EMPTY_RESPONSE: &str = "Empty response";

/// An image ready for display, stored as 8-bit RGBA
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: image::RgbaImage,
}

impl DecodedImage {
    /// Height over width, guarding against zero-width images
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width.max(1) as f32
    }
}

/// Decode PNG/JPEG/GIF bytes
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, String> {
    if bytes.is_empty() {
        return Err(EMPTY_RESPONSE.to_string());
    }
    let decoded = image::load_from_memory(bytes).map_err(|_| UNDECODABLE.to_string())?;
    let pixels = decoded.to_rgba8();
    Ok(DecodedImage {
        width: pixels.width(),
        height: pixels.height(),
        pixels,
    })
}

/// In-memory content cache, alive for the whole session
#[derive(Default)]
pub struct ContentCache {
    images: RwLock<HashMap<String, Arc<DecodedImage>>>,
    errors: RwLock<HashMap<String, String>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Arc<DecodedImage>> {
        self.images.read().get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.images.read().contains_key(url)
    }

    /// Store a decoded image and forget any earlier failure for the URL
    pub fn insert(&self, url: &str, image: DecodedImage) {
        self.images.write().insert(url.to_string(), Arc::new(image));
        self.errors.write().remove(url);
    }

    pub fn error(&self, url: &str) -> Option<String> {
        self.errors.read().get(url).cloned()
    }

    /// Record why a fetch failed, replacing any earlier reason
    pub fn record_error(&self, url: &str, reason: impl Into<String>) {
        self.errors.write().insert(url.to_string(), reason.into());
    }

    pub fn clear_error(&self, url: &str) {
        self.errors.write().remove(url);
    }

    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.read().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.read().len()
    }

    pub fn clear(&self) {
        self.images.write().clear();
        self.errors.write().clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Small PNG used across asset tests
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode_image(&png_bytes(4, 2)).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
        assert_eq!(decoded.aspect(), 0.5);
    }

    #[test]
    fn test_decode_failures_have_distinct_reasons() {
        assert_eq!(decode_image(&[]).unwrap_err(), EMPTY_RESPONSE);
        assert_eq!(decode_image(b"not an image").unwrap_err(), UNDECODABLE);
    }

    #[test]
    fn test_insert_clears_error() {
        let cache = ContentCache::new();
        cache.record_error("u", "HTTP 500 Internal Server Error");
        assert_eq!(cache.error("u").as_deref(), Some("HTTP 500 Internal Server Error"));

        cache.insert("u", decode_image(&png_bytes(1, 1)).unwrap());
        assert!(cache.contains("u"));
        assert_eq!(cache.error("u"), None);
        assert_eq!(cache.len(), 1);
    }
}
