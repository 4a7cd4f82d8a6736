use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

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

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    fn location(&self, path: &str) -> String {
        self.resolve(path).display().to_string()
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    /// Writes through a sibling `.tmp` file and renames it into place.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = full_path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(data)?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &full_path)?;

        Ok(())
    }
}
