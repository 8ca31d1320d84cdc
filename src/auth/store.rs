use std::io::Write;
use std::path::{Path, PathBuf};

use crate::auth::cache::TokenCache;
use crate::error::GraphError;

/// On-disk home of the [`TokenCache`]. The only writer of its backing file.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    cache: TokenCache,
}

impl CredentialStore {
    /// Read the cache from `path`. Never fails: a missing, unreadable or
    /// corrupt file yields an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match std::fs::read_to_string(&path) {
            Ok(data) => TokenCache::from_json(&data).unwrap_or_else(|e| {
                tracing::warn!("Ignoring token cache at {}: {e}", path.display());
                TokenCache::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No token cache at {}", path.display());
                TokenCache::default()
            }
            Err(e) => {
                tracing::warn!("Cannot read token cache at {}: {e}", path.display());
                TokenCache::default()
            }
        };
        Self { path, cache }
    }

    /// Write the cache if it changed since the last save. Returns whether
    /// the file was written. Concurrent writers are not coordinated.
    pub fn save(&mut self) -> Result<bool, GraphError> {
        if !self.cache.has_state_changed() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = self.cache.to_json()?;
        write_private(&self.path, data.as_bytes())?;
        self.cache.clear_state_changed();
        tracing::debug!("Saved token cache to {}", self.path.display());
        Ok(true)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TokenCache {
        &mut self.cache
    }
}

/// Write `data` to `path`, readable by the owner only on Unix.
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies when the file is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)
}
