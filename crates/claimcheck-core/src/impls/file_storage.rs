//! FileStorage - one JSON file per key under a state directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::ClientError;
use crate::ports::Storage;

pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write-then-rename so a crash never leaves a half-written file.
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("state")).unwrap();

        assert_eq!(storage.get("claimcheck.tasks").unwrap(), None);

        storage.set("claimcheck.tasks", "[1,2]").unwrap();
        assert_eq!(storage.get("claimcheck.tasks").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("state/claimcheck.tasks.json").exists());

        storage.set("claimcheck.tasks", "[]").unwrap();
        assert_eq!(storage.get("claimcheck.tasks").unwrap().as_deref(), Some("[]"));

        storage.remove("claimcheck.tasks").unwrap();
        assert_eq!(storage.get("claimcheck.tasks").unwrap(), None);
        storage.remove("claimcheck.tasks").unwrap();
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("../outside", "x").unwrap();
        assert!(dir.path().join(".._outside.json").exists());
    }
}
