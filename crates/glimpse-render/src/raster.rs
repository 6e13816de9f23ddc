//! Rasterization: interaction snapshots and export encoding, backed by resvg/usvg/tiny-skia.

use crate::error::{RenderError, Result};
use crate::options::{ExportFormat, ExportOptions, ViewportOptions};
use crate::surface::Bitmap;
use glimpse_core::geom::{ContentSize, ScreenSize};
use glimpse_core::svg::{FALLBACK_SIZE, embedded_svg, ensure_namespace, intrinsic_size};
use glimpse_core::{Background, ContentKind, Transform};

/// Largest snapshot side accepted, in pixels.
pub const MAX_SNAPSHOT_SIDE: f64 = 16_384.0;

/// One snapshot request.
#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    pub content: &'a str,
    pub kind: ContentKind,
    /// Transform at capture time; the content is drawn exactly as the surface shows it.
    pub transform: Transform,
    /// Size of the surface; the snapshot covers exactly this area.
    pub viewport: ScreenSize,
    pub background: Background,
}

/// Turns content into a bitmap snapshot.
///
/// Hosts with a native markup renderer implement this to snapshot `Markup` content; the default
/// [`SvgRasterizer`] only understands SVG.
pub trait Rasterizer {
    fn rasterize(&self, request: &RasterRequest<'_>) -> Result<Bitmap>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn rasterize(&self, request: &RasterRequest<'_>) -> Result<Bitmap> {
        (**self).rasterize(request)
    }
}

#[derive(Debug, Clone)]
pub struct SvgRasterizer {
    fallback: ContentSize,
    font_family: String,
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_SIZE,
            font_family: "Arial".to_string(),
        }
    }
}

fn fill_background(pixmap: &mut tiny_skia::Pixmap, background: Background) {
    if background != Background::Transparent {
        let [r, g, b, a] = background.rgba8();
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }
}

fn pixel_side(len: f64) -> Result<u32> {
    if !(len.is_finite() && len > 0.0 && len <= MAX_SNAPSHOT_SIDE) {
        return Err(RenderError::PixmapAlloc);
    }
    Ok(len.ceil().max(1.0) as u32)
}

impl SvgRasterizer {
    pub fn from_options(options: &ViewportOptions) -> Self {
        Self {
            fallback: options.fallback_size(),
            font_family: options.font_family.clone(),
        }
    }

    pub fn fallback(&self) -> ContentSize {
        self.fallback
    }

    fn parse_tree(&self, svg: &str) -> Result<usvg::Tree> {
        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        opt.font_family = self.font_family.clone();

        let svg = ensure_namespace(svg);
        usvg::Tree::from_str(&svg, &opt).map_err(|err| RenderError::InvalidMarkup {
            message: err.to_string(),
        })
    }

    /// Scale that maps usvg's own document size onto `size * scale`.
    ///
    /// usvg resolves physical units and aspect ratio itself; stretching its tree onto the
    /// intrinsic size keeps rendering in line with [`intrinsic_size`].
    fn fit_scale(tree: &usvg::Tree, size: ContentSize, scale: f32) -> (f32, f32) {
        let tree_size = tree.size();
        (
            size.width as f32 * scale / tree_size.width(),
            size.height as f32 * scale / tree_size.height(),
        )
    }

    /// Renders `svg` at `scale` device pixels per content unit.
    ///
    /// The pixmap is `ceil(width * scale) x ceil(height * scale)` where width/height come from
    /// [`intrinsic_size`], and the background is filled first unless it is transparent.
    pub fn render_pixmap(
        &self,
        svg: &str,
        scale: f32,
        background: Background,
    ) -> Result<tiny_skia::Pixmap> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(RenderError::PixmapAlloc);
        }
        let size = intrinsic_size(svg, self.fallback);
        let tree = self.parse_tree(svg)?;

        let width_px = (size.width as f32 * scale).ceil().max(1.0) as u32;
        let height_px = (size.height as f32 * scale).ceil().max(1.0) as u32;
        let mut pixmap =
            tiny_skia::Pixmap::new(width_px, height_px).ok_or(RenderError::PixmapAlloc)?;
        fill_background(&mut pixmap, background);

        let (sx, sy) = Self::fit_scale(&tree, size, scale);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(sx, sy),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap)
    }

    /// Renders `svg` as the surface shows it under `transform`, clipped to `viewport`.
    ///
    /// The pixmap is `ceil(viewport.width) x ceil(viewport.height)` whatever the content size
    /// or zoom; viewports with a side above [`MAX_SNAPSHOT_SIDE`] are refused.
    pub fn render_view(
        &self,
        svg: &str,
        transform: &Transform,
        viewport: ScreenSize,
        background: Background,
    ) -> Result<tiny_skia::Pixmap> {
        let scale = transform.scale as f32;
        if !(scale.is_finite() && scale > 0.0 && transform.is_finite()) {
            return Err(RenderError::PixmapAlloc);
        }
        let width_px = pixel_side(viewport.width)?;
        let height_px = pixel_side(viewport.height)?;
        let size = intrinsic_size(svg, self.fallback);
        let tree = self.parse_tree(svg)?;

        let mut pixmap =
            tiny_skia::Pixmap::new(width_px, height_px).ok_or(RenderError::PixmapAlloc)?;
        fill_background(&mut pixmap, background);

        let (sx, sy) = Self::fit_scale(&tree, size, scale);
        let offset = transform.screen_offset();
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(sx, sy).post_translate(offset.x as f32, offset.y as f32),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap)
    }

    pub fn export_png(&self, svg: &str, options: &ExportOptions) -> Result<Vec<u8>> {
        let pixmap = self.render_pixmap(svg, options.scale, options.background)?;
        pixmap.encode_png().map_err(|_| RenderError::PngEncode)
    }

    pub fn export_jpeg(&self, svg: &str, options: &ExportOptions) -> Result<Vec<u8>> {
        if !options.background.is_opaque() {
            return Err(RenderError::JpegOpaqueBackgroundRequired);
        }

        let pixmap = self.render_pixmap(svg, options.scale, options.background)?;
        let (w, h) = (pixmap.width(), pixmap.height());

        // Opaque fill means every alpha byte is 255, so premultiplied RGB is plain RGB.
        let rgba = pixmap.data();
        let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
        for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
            dst.copy_from_slice(&src[..3]);
        }

        let mut out = Vec::new();
        let mut enc =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
        enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
            .map_err(|_| RenderError::JpegEncode)?;
        Ok(out)
    }

    pub fn export(&self, svg: &str, options: &ExportOptions) -> Result<Vec<u8>> {
        match options.format {
            ExportFormat::Png => self.export_png(svg, options),
            ExportFormat::Jpeg => self.export_jpeg(svg, options),
        }
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(&self, request: &RasterRequest<'_>) -> Result<Bitmap> {
        let svg = match request.kind {
            ContentKind::Vector => request.content,
            ContentKind::Markup => {
                embedded_svg(request.content).ok_or_else(|| RenderError::InvalidMarkup {
                    message: "markup has no embedded <svg> element to rasterize".to_string(),
                })?
            }
        };
        let pixmap = self.render_view(
            svg,
            &request.transform,
            request.viewport,
            request.background,
        )?;
        Ok(Bitmap::from_pixmap(pixmap))
    }
}

pub fn svg_to_png(svg: &str, options: &ExportOptions) -> Result<Vec<u8>> {
    SvgRasterizer::default().export_png(svg, options)
}

pub fn svg_to_jpeg(svg: &str, options: &ExportOptions) -> Result<Vec<u8>> {
    SvgRasterizer::default().export_jpeg(svg, options)
}
