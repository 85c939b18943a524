//! Configuration document decoding, encoding and file persistence.
//!
//! Decoding treats a missing or empty file as an empty document. Writes go to
//! a temporary file in the same directory which is then renamed over the
//! target, so a concurrent reader never observes a half-written document.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::schema::ConfigDocument;
use crate::error::{Error, Result};

/// Reads and writes configuration documents.
///
/// # Examples
///
/// ```
/// use tanzu_config::config::DocumentLoader;
///
/// let doc = DocumentLoader::decode("contexts: []\n").unwrap();
/// assert!(doc.contexts.is_empty());
///
/// let yaml = DocumentLoader::encode(&doc).unwrap();
/// assert_eq!(DocumentLoader::decode(&yaml).unwrap(), doc);
/// ```
pub struct DocumentLoader;

impl DocumentLoader {
    /// Decode a document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if the text is not a valid document.
    pub fn decode(contents: &str) -> Result<ConfigDocument> {
        if contents.trim().is_empty() {
            return Ok(ConfigDocument::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Encode a document to YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if serialization fails.
    pub fn encode(doc: &ConfigDocument) -> Result<String> {
        Ok(serde_yaml::to_string(doc)?)
    }

    /// Load a document from disk; a missing file yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn load_file(path: &Path) -> Result<ConfigDocument> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} does not exist yet, using empty document", path.display());
                return Ok(ConfigDocument::default());
            }
            Err(e) => {
                return Err(Error::InvalidPath {
                    path: path.to_path_buf(),
                    reason: format!("Failed to read configuration file: {e}"),
                })
            }
        };

        Self::decode(&contents)
    }

    /// Atomically replace the file at `path` with the encoded document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the file cannot be written.
    pub fn save_file(path: &Path, doc: &ConfigDocument) -> Result<()> {
        let encoded = Self::encode(doc)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(encoded.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        log::debug!("wrote {} bytes to {}", encoded.len(), path.display());
        Ok(())
    }
}
