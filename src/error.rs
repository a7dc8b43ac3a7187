use std::{error, fmt, io, path::PathBuf};

use serde_json::Error as SerdeError;

/// Failure while reading a map, tileset or image asset.
#[derive(Debug)]
pub enum LoadError {
    /// File I/O error
    Io { path: PathBuf, source: io::Error },
    /// JSON parse error
    Json { path: PathBuf, source: SerdeError },
    /// Unsupported file format (non-JSON)
    UnsupportedFormat(String),
    /// Structurally valid JSON that does not describe a usable map
    InvalidMap(String),
    /// A layer's data length does not match width * height
    InvalidLayerSize {
        layer: String,
        expected: usize,
        actual: usize,
    },
    /// A cell references a gid no tileset covers
    InvalidTileGid { layer: String, gid: u32, max_gid: u32 },
    /// Image could not be read or decoded by the backend
    Image { path: PathBuf, reason: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            LoadError::Json { path, source } => {
                write!(f, "Failed to parse JSON in {}: {}", path.display(), source)
            }
            LoadError::UnsupportedFormat(path) => write!(f, "Unsupported file format: {}", path),
            LoadError::InvalidMap(msg) => write!(f, "Invalid map: {}", msg),
            LoadError::InvalidLayerSize {
                layer,
                expected,
                actual,
            } => write!(
                f,
                "Invalid layer size for layer '{}': expected {} cells, found {}",
                layer, expected, actual
            ),
            LoadError::InvalidTileGid {
                layer,
                gid,
                max_gid,
            } => write!(
                f,
                "Layer '{}' references gid {} but the highest known gid is {}",
                layer, gid, max_gid
            ),
            LoadError::Image { path, reason } => {
                write!(f, "Failed to load image {}: {}", path.display(), reason)
            }
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure reported by the graphics backend at draw time.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The backend rejected a call
    Backend(String),
    /// Requested render slot does not exist
    InvalidSlot { slot: usize, max: usize },
    /// An offscreen target of this size could not be created
    TargetAllocation { width: u32, height: u32 },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Backend(msg) => write!(f, "Render backend error: {}", msg),
            RenderError::InvalidSlot { slot, max } => {
                write!(f, "Render slot {} out of range (max {})", slot, max)
            }
            RenderError::TargetAllocation { width, height } => {
                write!(f, "Could not create a {}x{} render target", width, height)
            }
        }
    }
}

impl error::Error for RenderError {}

/// Top-level error for the runtime.
#[derive(Debug)]
pub enum Error {
    /// Missing or corrupt asset; fatal at startup
    Load(LoadError),
    /// Offscreen surface could not be allocated
    Allocation { width: u32, height: u32 },
    /// Draw call failed; the frame continues without it
    Render(RenderError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Load(err) => write!(f, "{}", err),
            Error::Allocation { width, height } => {
                write!(f, "Could not allocate a {}x{} surface", width, height)
            }
            Error::Render(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Allocation { .. } => None,
        }
    }
}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Error::Load(err)
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        Error::Render(err)
    }
}
