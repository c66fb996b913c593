//! MIME type detection based on file extensions.
//!
//! The table uses the `mime.types` line format:
//!
//! ```text
//! text/html       html htm
//! image/png       png
//! ```
//!
//! The first line that lists an extension wins.

use std::collections::HashMap;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct MimeTypes {
    by_extension: HashMap<String, String>,
}

impl MimeTypes {
    /// Parses the contents of a `mime.types` style table.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut by_extension = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(mime) = fields.next() else {
                continue;
            };
            for ext in fields {
                by_extension
                    .entry(ext.to_string())
                    .or_insert_with(|| mime.to_string());
            }
        }

        Self { by_extension }
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    pub fn lookup(&self, ext: &str) -> Option<&str> {
        self.by_extension.get(ext).map(|v| v.as_str())
    }

    /// Looks up the type for a file by its extension.
    pub fn for_path(&self, path: &Path) -> Option<&str> {
        extension(path).and_then(|ext| self.lookup(ext))
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

/// Substring after the last `.` of the file name, if non-empty.
///
/// ```
/// # use std::path::Path;
/// # use spindle::http::mime::extension;
/// assert_eq!(extension(Path::new("/srv/www/song.tar.gz")), Some("gz"));
/// assert_eq!(extension(Path::new("/srv/www/README")), None);
/// ```
pub fn extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}
