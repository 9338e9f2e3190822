//! Named asset resolution
//!
//! Assets live under `<root>/images` and `<root>/sounds`. A name with an
//! extension is used as-is; a bare name must match exactly one `name.*`.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("no resource matching '{pattern}'")]
    NotFound { pattern: String },
    #[error("'{name}' is ambiguous, it matches {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<PathBuf>,
    },
    #[error("'{name}' is not a readable resource (full path: {path})")]
    Unreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Sound,
}

impl ResourceKind {
    fn dir_name(self) -> &'static str {
        match self {
            ResourceKind::Image => "images",
            ResourceKind::Sound => "sounds",
        }
    }
}

/// A loaded asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ResourceLoader {
    root: PathBuf,
}

impl ResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dir(&self, kind: ResourceKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Resolve a resource name to a file path
    pub fn resolve(&self, kind: ResourceKind, name: &str) -> Result<PathBuf, ResourceError> {
        let dir = self.dir(kind);
        if Path::new(name).extension().is_some() {
            return Ok(dir.join(name));
        }

        let pattern = format!("{}.*", dir.join(name).display());
        let entries = std::fs::read_dir(&dir).map_err(|_| ResourceError::NotFound {
            pattern: pattern.clone(),
        })?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().is_some()
                    && path.file_stem().is_some_and(|stem| stem == name)
            })
            .collect();
        candidates.sort();

        match candidates.len() {
            0 => Err(ResourceError::NotFound { pattern }),
            1 => Ok(candidates.remove(0)),
            _ => Err(ResourceError::Ambiguous {
                name: name.to_string(),
                candidates,
            }),
        }
    }

    /// Resolve and read a resource
    pub fn load(&self, kind: ResourceKind, name: &str) -> Result<Resource, ResourceError> {
        let path = self.resolve(kind, name)?;
        let bytes = std::fs::read(&path).map_err(|source| ResourceError::Unreadable {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded {} ({} bytes)", path.display(), bytes.len());
        Ok(Resource { path, bytes })
    }
}
