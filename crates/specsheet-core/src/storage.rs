//! Hand-off point for image bytes.

use crate::error::SpecsheetError;
use crate::model::{ExtractedImage, ParseResult};

/// Durable storage for extracted image content.
///
/// `store` receives the image (metadata and bytes) and returns a reference
/// (path, URL, key) that is recorded as the image's `storage_ref`.
pub trait ImageStore {
    fn store(&mut self, image: &ExtractedImage) -> Result<String, SpecsheetError>;
}

/// Keeps images in memory, keyed by id. Useful for callers that upload later.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub images: Vec<(String, Vec<u8>)>,
}

impl ImageStore for MemoryStore {
    fn store(&mut self, image: &ExtractedImage) -> Result<String, SpecsheetError> {
        self.images.push((image.id.clone(), image.content.clone()));
        Ok(format!("memory://{}", image.id))
    }
}

impl ParseResult {
    /// Move every image's bytes into `store`.
    ///
    /// The returned result keeps image metadata plus `storage_ref`; the
    /// content buffers are released. The first storage failure aborts.
    pub fn persist_images(mut self, store: &mut impl ImageStore) -> Result<ParseResult, SpecsheetError> {
        for image in &mut self.images {
            let reference = store.store(image)?;
            tracing::debug!(id = %image.id, reference = %reference, "stored image");
            image.storage_ref = Some(reference);
            image.content = Vec::new();
        }
        Ok(self)
    }
}
