use std::io;

/// World conversion error types
#[derive(Debug)]
pub enum WorldError {
    /// IO error occurred
    Io(io::Error),

    /// Buffer length does not match the declared raster shape
    ShapeMismatch { expected: String, actual: usize },

    /// Raster resolution differs from the one it must match
    ResolutionMismatch {
        raster: String,
        expected: usize,
        actual: usize,
    },

    /// Raster index outside of its bound
    OutOfRange {
        channel: usize,
        row: usize,
        col: usize,
        channels: usize,
        res: usize,
    },

    /// Named map absent from a package
    MissingMap(String),

    /// Invalid file format
    InvalidFormat(String),

    /// A scene collaborator failed while producing its data
    Scene(String),
}

impl std::fmt::Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldError::Io(e) => write!(f, "IO error: {}", e),
            WorldError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {}, got {} bytes", expected, actual)
            }
            WorldError::ResolutionMismatch {
                raster,
                expected,
                actual,
            } => write!(
                f,
                "Resolution mismatch: expected {} raster at {}x{}, got {}x{}",
                raster, expected, expected, actual, actual
            ),
            WorldError::OutOfRange {
                channel,
                row,
                col,
                channels,
                res,
            } => write!(
                f,
                "Index out of range: [{}, {}, {}] for {} channel(s) at {}x{}",
                channel, row, col, channels, res, res
            ),
            WorldError::MissingMap(name) => write!(f, "Map not found: {}", name),
            WorldError::InvalidFormat(msg) => write!(f, "Invalid file format: {}", msg),
            WorldError::Scene(msg) => write!(f, "Scene error: {}", msg),
        }
    }
}

impl std::error::Error for WorldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorldError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WorldError {
    fn from(err: io::Error) -> Self {
        WorldError::Io(err)
    }
}

impl From<binrw::Error> for WorldError {
    fn from(err: binrw::Error) -> Self {
        match root_cause(err) {
            binrw::Error::Io(e) => WorldError::Io(e),
            other => WorldError::InvalidFormat(other.to_string()),
        }
    }
}

/// Strip binrw's field backtrace frames, keeping the error that started them.
fn root_cause(err: binrw::Error) -> binrw::Error {
    match err {
        binrw::Error::Backtrace(bt) => root_cause(*bt.error),
        other => other,
    }
}

/// Result type for world operations
pub type Result<T> = std::result::Result<T, WorldError>;
