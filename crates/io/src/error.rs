use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum PersistError {
    /// Serializing the artifact failed before anything touched disk.
    Encode { path: PathBuf, message: String },
    /// Creating the directory or writing the file failed.
    Write { path: PathBuf, message: String },
}

impl PersistError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Encode { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode { path, message } => {
                write!(f, "cannot encode {}: {message}", path.display())
            }
            Self::Write { path, message } => {
                write!(f, "cannot write {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for PersistError {}
