//! PDF output: one bottom-up page with embedded TrueType fonts.

use menu_render_layout::{CoordinateSystem, TextCommand};
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Px, Rgb,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use crate::font::{FontLibrary, FontLoadError};
use crate::target::{BackendError, RenderTarget};

const MM_PER_PT: f32 = 25.4 / 72.0;

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * MM_PER_PT)
}

/// Single-page PDF document sized in points.
pub struct PdfTarget {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Arc<FontLibrary>,
    embedded: HashMap<String, IndirectFontRef>,
    width_pt: f32,
    height_pt: f32,
}

impl core::fmt::Debug for PdfTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PdfTarget")
            .field("width_pt", &self.width_pt)
            .field("height_pt", &self.height_pt)
            .field("embedded_fonts", &self.embedded.len())
            .finish()
    }
}

impl PdfTarget {
    /// Empty page of `width_pt` x `height_pt` points.
    pub fn new(title: &str, width_pt: f32, height_pt: f32, fonts: Arc<FontLibrary>) -> Self {
        let (doc, page, layer) =
            PdfDocument::new(title, pt_to_mm(width_pt), pt_to_mm(height_pt), "Menu");
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            fonts,
            embedded: HashMap::new(),
            width_pt,
            height_pt,
        }
    }

    /// Paint a background image stretched over the whole page.
    ///
    /// Must be called before any text is drawn so text stays on top.
    pub fn with_background(self, path: &Path) -> Result<Self, BackendError> {
        let rgb = flatten_on_white(image::open(path)?.to_rgba8());
        let (width_px, height_px) = rgb.dimensions();
        if width_px == 0 || height_px == 0 {
            return Ok(self);
        }

        let page_width_in = self.width_pt / 72.0;
        let page_height_in = self.height_pt / 72.0;
        let dpi = width_px as f32 / page_width_in;
        let scale_y = page_height_in * dpi / height_px as f32;

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                dpi: Some(dpi),
                scale_y: Some(scale_y),
                ..Default::default()
            },
        );
        log::debug!(
            "embedded background {} ({}x{} px at {:.1} dpi)",
            path.display(),
            width_px,
            height_px,
            dpi
        );
        Ok(self)
    }

    /// Serialize the document into memory.
    pub fn into_bytes(self) -> Result<Vec<u8>, BackendError> {
        self.doc
            .save_to_bytes()
            .map_err(|err| BackendError::Pdf(err.to_string()))
    }

    fn font_ref(&mut self, name: &str) -> Result<IndirectFontRef, BackendError> {
        if let Some(font) = self.embedded.get(name) {
            return Ok(font.clone());
        }
        let face = self
            .fonts
            .face(name)
            .ok_or_else(|| FontLoadError::Unregistered(name.to_string()))?;
        let font = self
            .doc
            .add_external_font(face.data())
            .map_err(|err| BackendError::Pdf(format!("embedding font {name:?}: {err}")))?;
        self.embedded.insert(name.to_string(), font.clone());
        Ok(font)
    }
}

impl RenderTarget for PdfTarget {
    fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::BottomUp
    }

    fn canvas_size(&self) -> (f32, f32) {
        (self.width_pt, self.height_pt)
    }

    /// `cmd.y` is the baseline measured up from the bottom edge.
    fn draw_text(&mut self, cmd: &TextCommand) -> Result<(), BackendError> {
        let font = self.font_ref(&cmd.font)?;
        let (r, g, b) = cmd.color.to_unit_rgb();
        self.layer
            .set_fill_color(printpdf::Color::Rgb(Rgb::new(r, g, b, None)));
        self.layer
            .use_text(cmd.text.as_str(), cmd.size, pt_to_mm(cmd.x), pt_to_mm(cmd.y), &font);
        Ok(())
    }

    fn finish(self, path: &Path) -> Result<(), BackendError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.doc
            .save(&mut writer)
            .map_err(|err| BackendError::Pdf(err.to_string()))?;
        log::info!(
            "saved {:.2}x{:.2} pt PDF to {}",
            self.width_pt,
            self.height_pt,
            path.display()
        );
        Ok(())
    }
}

/// Composite RGBA onto white; PDF image XObjects here carry no alpha.
fn flatten_on_white(rgba: image::RgbaImage) -> image::RgbImage {
    let (width, height) = rgba.dimensions();
    let mut rgb = image::RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = f32::from(a) / 255.0;
        let over_white = |c: u8| (f32::from(c) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        rgb.put_pixel(x, y, image::Rgb([over_white(r), over_white(g), over_white(b)]));
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_render_layout::{BlockRole, Color};

    #[test]
    fn empty_page_serializes_to_pdf_bytes() {
        let target = PdfTarget::new("Menu", 419.25, 595.5, Arc::new(FontLibrary::new()));
        assert_eq!(target.coordinate_system(), CoordinateSystem::BottomUp);
        assert_eq!(target.canvas_size(), (419.25, 595.5));
        let bytes = target.into_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn text_in_unregistered_font_is_rejected() {
        let mut target = PdfTarget::new("Menu", 100.0, 100.0, Arc::new(FontLibrary::new()));
        let err = target
            .draw_text(&TextCommand {
                x: 1.0,
                y: 90.0,
                text: "Sernik".to_string(),
                font: "Argent".to_string(),
                size: 12.0,
                color: Color::BLACK,
                role: BlockRole::DishName,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Font(FontLoadError::Unregistered(_))
        ));
    }

    #[test]
    fn flatten_on_white_composites_transparency() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        let rgb = flatten_on_white(rgba);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn background_is_embedded_from_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        image::RgbaImage::from_pixel(8, 12, image::Rgba([200, 180, 150, 255]))
            .save(&path)
            .unwrap();
        let target = PdfTarget::new("Menu", 419.25, 595.5, Arc::new(FontLibrary::new()))
            .with_background(&path)
            .unwrap();
        let bytes = target.into_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
