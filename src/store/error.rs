// Store error module
// Closed set of faults the layer store can report

use std::io;
use std::path::PathBuf;

/// Store operation failure
///
/// The HTTP layer collapses every variant into the same `{"error": ...}`
/// response; the variants exist so logs and tests can tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store file does not exist at request time
    #[error("No such file or directory: '{}'", .0.display())]
    NotFound(PathBuf),

    /// Existing contents are not valid JSON
    #[error("Malformed store contents: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Valid JSON, but the root is not an object holding a `layers` array
    #[error("Store document has no 'layers' list")]
    MissingLayers,

    /// Any other I/O fault (open, read, write, truncate)
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Map an error from opening or reading the store file
    pub fn from_access(path: &std::path::Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io(err)
        }
    }
}
