use glimpse_core::ContentKind;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("failed to decode content for rasterization: {message}")]
    InvalidMarkup { message: String },
    #[error("raster export is only available for vector content (got {kind})")]
    UnsupportedExport { kind: ContentKind },
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG")]
    JpegEncode,
    #[error("viewport engine has been disposed")]
    Disposed,
}
