//! Maps request URIs onto the filesystem without leaving the served root.

use std::io;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{uri} does not resolve: {source}")]
    NotFound { uri: String, source: io::Error },
    #[error("{uri} is not valid UTF-8 once decoded")]
    InvalidEncoding { uri: String },
    #[error("{} is outside the served root", path.display())]
    OutsideRoot { path: PathBuf },
}

/// Resolves `uri` to a canonical path under `root`.
///
/// The URI is percent-decoded and joined onto `root` as a relative path,
/// then canonicalized (dot segments and symlinks resolved). The result must
/// have the canonical root as a leading run of path components; a sibling
/// that merely shares a string prefix (`/srv/www2` for `/srv/www`) is
/// rejected.
pub async fn resolve(uri: &str, root: &Path) -> Result<PathBuf, ResolveError> {
    let decoded = percent_decode_str(uri)
        .decode_utf8()
        .map_err(|_| ResolveError::InvalidEncoding {
            uri: uri.to_string(),
        })?;

    let not_found = |source| ResolveError::NotFound {
        uri: uri.to_string(),
        source,
    };
    let root = tokio::fs::canonicalize(root).await.map_err(not_found)?;
    let candidate = root.join(decoded.trim_start_matches('/'));
    let path = tokio::fs::canonicalize(&candidate)
        .await
        .map_err(not_found)?;

    if !path.starts_with(&root) {
        return Err(ResolveError::OutsideRoot { path });
    }
    Ok(path)
}
