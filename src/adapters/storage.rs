use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write next to the target and rename so readers never see a partial PNG.
        let staging = full_path.with_extension("png.partial");
        fs::write(&staging, data)?;
        if let Err(e) = fs::rename(&staging, &full_path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_overwrites_previous_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage.write_file("map_preview.png", b"first").await.unwrap();
        storage.write_file("map_preview.png", b"second").await.unwrap();

        let data = fs::read(storage.resolve("map_preview.png")).unwrap();
        assert_eq!(data, b"second");
        assert!(!temp_dir.path().join("map_preview.png.partial").exists());
    }

    #[tokio::test]
    async fn test_write_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("nested/out"));

        storage.write_file("map.png", b"png").await.unwrap();
        assert!(temp_dir.path().join("nested/out/map.png").exists());
    }
}
