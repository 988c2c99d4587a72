//! PNG output: an RGBA canvas with alpha-blended TTF glyph coverage.

use ab_glyph::{point, Font, ScaleFont};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use menu_render_layout::{Color, CoordinateSystem, TextCommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::font::{FontLibrary, FontLoadError};
use crate::target::{BackendError, RenderTarget};

/// Top-down raster canvas.
#[derive(Debug)]
pub struct RasterTarget {
    canvas: RgbaImage,
    fonts: Arc<FontLibrary>,
}

impl RasterTarget {
    /// White canvas of the given pixel size.
    pub fn blank(width: u32, height: u32, fonts: Arc<FontLibrary>) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            fonts,
        }
    }

    /// Canvas based on a background image; the output takes its size.
    pub fn from_background(path: &Path, fonts: Arc<FontLibrary>) -> Result<Self, BackendError> {
        let canvas = image::open(path)?.to_rgba8();
        log::debug!(
            "loaded background {} ({}x{})",
            path.display(),
            canvas.width(),
            canvas.height()
        );
        Ok(Self { canvas, fonts })
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    /// Encode the canvas as PNG with maximum compression.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), BackendError> {
        let encoder =
            PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
        encoder.write_image(
            self.canvas.as_raw(),
            self.canvas.width(),
            self.canvas.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }

    fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.canvas.width() || y >= self.canvas.height() {
            return;
        }
        let alpha = coverage.clamp(0.0, 1.0) * f32::from(color.a) / 255.0;
        if alpha <= 0.0 {
            return;
        }
        let inv = 1.0 - alpha;
        let dst = self.canvas.get_pixel_mut(x, y);
        let mix = |src: u8, dst: u8| (f32::from(src) * alpha + f32::from(dst) * inv).round() as u8;
        dst.0[0] = mix(color.r, dst.0[0]);
        dst.0[1] = mix(color.g, dst.0[1]);
        dst.0[2] = mix(color.b, dst.0[2]);
        dst.0[3] = (alpha * 255.0 + f32::from(dst.0[3]) * inv).round() as u8;
    }
}

impl RenderTarget for RasterTarget {
    fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::TopDown
    }

    fn canvas_size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    /// `cmd.y` is the top of the line; glyphs sit on `y + ascent`.
    fn draw_text(&mut self, cmd: &TextCommand) -> Result<(), BackendError> {
        let fonts = Arc::clone(&self.fonts);
        let face = fonts
            .face(&cmd.font)
            .ok_or_else(|| FontLoadError::Unregistered(cmd.font.clone()))?;
        let scale = face.px_scale(cmd.size);
        let scaled = face.font().as_scaled(scale);
        let baseline = cmd.y + scaled.ascent();
        let mut caret = cmd.x;

        for ch in cmd.text.chars() {
            let glyph_id = scaled.glyph_id(ch);
            let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(glyph_id);
            let Some(outlined) = face.font().outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
            outlined.draw(|gx, gy, coverage| {
                self.blend(left + gx as i32, top + gy as i32, cmd.color, coverage);
            });
        }
        Ok(())
    }

    fn finish(self, path: &Path) -> Result<(), BackendError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_png(&mut writer)?;
        writer.flush()?;
        log::info!(
            "saved {}x{} PNG to {}",
            self.canvas.width(),
            self.canvas.height(),
            path.display()
        );
        Ok(())
    }
}
