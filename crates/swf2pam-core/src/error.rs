use thiserror::Error;

#[derive(Debug, Error)]
pub enum PamError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The document uses a feature the PAM format cannot represent at all.
    #[error("Unsupported content: {0}")]
    FormatRestriction(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Image of {width}x{height} does not fit on an empty atlas page")]
    OutOfSpace { width: u32, height: u32 },
    #[error("Paint of {w}x{h} at ({x}, {y}) exceeds page bounds {page_w}x{page_h}")]
    OutOfBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        page_w: u32,
        page_h: u32,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PamError {
    /// Process exit status for this class of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            PamError::FormatRestriction(_) => 2,
            PamError::InvalidData(_) => 3,
            PamError::OutOfSpace { .. } | PamError::OutOfBounds { .. } => 4,
            PamError::InvalidConfig(_) => 5,
            PamError::Io(_) | PamError::Image(_) | PamError::Json(_) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, PamError>;
