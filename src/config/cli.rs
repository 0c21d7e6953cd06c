use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Result files under a local directory (the match's `RESULTDIR`).
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn ensure_parent(full_path: &Path) -> Result<()> {
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);
        Self::ensure_parent(&full_path)?;
        fs::write(full_path, data)?;
        Ok(())
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);
        Self::ensure_parent(&full_path)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(full_path)?;
        file.write_all(data)?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        Path::new(&self.base_path).join(path).exists()
    }

    fn location(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}
