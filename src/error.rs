/// Crate-wide error type.
///
/// Engine-level "failures" (no image loaded, degenerate region) are ordinary
/// no-op paths inside the blur operations themselves; they only surface as
/// this enum at the ingest/export boundary, where the user has to be told
/// why a paste was rejected or a copy failed.
#[derive(Debug)]
pub enum ObscuraError {
    /// A blur or export was requested before any image was ingested.
    NoImageLoaded,
    /// A selection or brush footprint with zero area.
    DegenerateRegion,
    /// Pasted/dropped data whose mime type is not an image type.
    UnsupportedFormat(String),
    /// The bytes claimed to be an image but could not be decoded.
    Decode(String),
    /// Clipboard write or PNG encode/save was denied by the platform.
    Export(String),
    Io(std::io::Error),
}

impl std::fmt::Display for ObscuraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObscuraError::NoImageLoaded => write!(f, "no image loaded"),
            ObscuraError::DegenerateRegion => write!(f, "selection has zero area"),
            ObscuraError::UnsupportedFormat(mime) => {
                write!(f, "unsupported format: {}", mime)
            }
            ObscuraError::Decode(e) => write!(f, "decode error: {}", e),
            ObscuraError::Export(e) => write!(f, "export failed: {}", e),
            ObscuraError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ObscuraError {}

impl From<std::io::Error> for ObscuraError {
    fn from(e: std::io::Error) -> Self {
        ObscuraError::Io(e)
    }
}
