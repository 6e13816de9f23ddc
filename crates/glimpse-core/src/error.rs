pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid SVG: {message}")]
    InvalidSvg { message: String },

    #[error("Unsupported background: {value} (expected transparent, white or black)")]
    UnsupportedBackground { value: String },

    #[error("Unsupported content kind: {value} (expected vector or markup)")]
    UnsupportedContentKind { value: String },
}
