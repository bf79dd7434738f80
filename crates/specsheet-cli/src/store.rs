use specsheet_core::error::SpecsheetError;
use specsheet_core::model::ExtractedImage;
use specsheet_core::storage::ImageStore;
use std::path::{Path, PathBuf};

/// Writes images to `<root>/<category>/<id>.<ext>`.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl ImageStore for DirStore {
    fn store(&mut self, image: &ExtractedImage) -> Result<String, SpecsheetError> {
        let dir = self.root.join(image.category.as_str());
        std::fs::create_dir_all(&dir)
            .map_err(|e| SpecsheetError::ImageStore(format!("{}: {e}", dir.display())))?;
        let path = dir.join(format!("{}.{}", image.id, extension(image)));
        std::fs::write(&path, &image.content)
            .map_err(|e| SpecsheetError::ImageStore(format!("{}: {e}", path.display())))?;
        tracing::debug!(id = %image.id, path = %path.display(), "image saved");
        Ok(path.display().to_string())
    }
}

fn extension(image: &ExtractedImage) -> String {
    let from_mime = match image.mime_type.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/webp" => Some("webp"),
        "image/tiff" => Some("tiff"),
        "image/svg+xml" => Some("svg"),
        "image/x-emf" | "image/emf" => Some("emf"),
        "image/x-wmf" | "image/wmf" => Some("wmf"),
        _ => None,
    };
    if let Some(ext) = from_mime {
        return ext.to_string();
    }
    Path::new(&image.file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specsheet_core::classify::ImageCategory;
    use specsheet_core::model::CellAnchor;

    fn image(mime: &str, file_name: &str) -> ExtractedImage {
        ExtractedImage {
            id: "img_0123456789abcdef".into(),
            sheet_name: "Design Assets".into(),
            cell_reference: "B2".into(),
            file_name: file_name.into(),
            name: None,
            description: None,
            mime_type: mime.into(),
            width: None,
            height: None,
            file_size: 3,
            category: ImageCategory::Mockup,
            context: None,
            storage_ref: None,
            anchor: CellAnchor::default(),
            content: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_writes_under_category_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path());
        let location = store.store(&image("image/png", "image1.png")).unwrap();

        let expected = dir.path().join("mockup").join("img_0123456789abcdef.png");
        assert_eq!(location, expected.display().to_string());
        assert_eq!(std::fs::read(expected).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_extension_falls_back_to_file_name() {
        assert_eq!(extension(&image("image/jpeg", "photo.jpeg")), "jpg");
        assert_eq!(extension(&image("application/octet-stream", "chart.EMF")), "emf");
        assert_eq!(extension(&image("application/octet-stream", "blob")), "bin");
    }
}
