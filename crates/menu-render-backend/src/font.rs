use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use core::fmt;
use menu_render_layout::{HeuristicMeasurer, TextMeasurer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A parsed TrueType/OpenType face plus its raw bytes.
pub struct FontFace {
    name: String,
    path: PathBuf,
    data: Vec<u8>,
    font: FontVec,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontFace {
    /// Parse font bytes. `path` is kept for diagnostics only.
    pub fn from_bytes(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        data: Vec<u8>,
    ) -> Result<Self, FontLoadError> {
        let path = path.into();
        let font = FontVec::try_from_vec(data.clone())
            .map_err(|_| FontLoadError::Invalid(path.clone()))?;
        Ok(Self {
            name: name.into(),
            path,
            data,
            font,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw font file bytes (embedded as-is into PDF output).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }

    /// Pixel scale for an em size of `size` units.
    pub fn px_scale(&self, size: f32) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * self.font.height_unscaled() / units_per_em)
    }

    /// Advance width of `text` at `size`.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(self.px_scale(size));
        text.chars()
            .map(|ch| scaled.h_advance(scaled.glyph_id(ch)))
            .sum()
    }

    /// Distance from the top of a line to its baseline at `size`.
    pub fn ascent(&self, size: f32) -> f32 {
        self.font.as_scaled(self.px_scale(size)).ascent()
    }
}

/// Named font faces shared by the measurer and the render targets.
#[derive(Debug, Default)]
pub struct FontLibrary {
    faces: BTreeMap<String, FontFace>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `(name, path)` pair, failing on the first missing or
    /// unparsable file.
    pub fn load<'a, I>(fonts: I) -> Result<Self, FontLoadError>
    where
        I: IntoIterator<Item = (&'a str, &'a Path)>,
    {
        let mut library = Self::new();
        for (name, path) in fonts {
            library.load_file(name, path)?;
        }
        Ok(library)
    }

    /// Read and register one font file under `name`.
    pub fn load_file(&mut self, name: &str, path: &Path) -> Result<(), FontLoadError> {
        if !path.is_file() {
            return Err(FontLoadError::Missing(path.to_path_buf()));
        }
        let data = std::fs::read(path).map_err(|err| FontLoadError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        self.insert(FontFace::from_bytes(name, path, data)?);
        log::debug!("registered font {:?} from {}", name, path.display());
        Ok(())
    }

    /// Register a parsed face, replacing any face with the same name.
    pub fn insert(&mut self, face: FontFace) {
        self.faces.insert(face.name.clone(), face);
    }

    pub fn face(&self, name: &str) -> Option<&FontFace> {
        self.faces.get(name)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Ensure every name in `names` has a registered face.
    pub fn require<'a, I>(&self, names: I) -> Result<(), FontLoadError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            if !self.faces.contains_key(name) {
                return Err(FontLoadError::Unregistered(name.to_string()));
            }
        }
        Ok(())
    }
}

impl TextMeasurer for FontLibrary {
    fn measure_text(&self, text: &str, font: &str, size: f32) -> f32 {
        match self.face(font) {
            Some(face) => face.measure(text, size),
            None => HeuristicMeasurer.measure_text(text, font, size),
        }
    }
}

/// Font loading error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontLoadError {
    /// Font file does not exist.
    Missing(PathBuf),
    /// Font file exists but could not be read.
    Io { path: PathBuf, message: String },
    /// Font bytes are not a parsable TrueType/OpenType face.
    Invalid(PathBuf),
    /// A style references a font name with no registered face.
    Unregistered(String),
}

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "font file not found: {}", path.display()),
            Self::Io { path, message } => {
                write!(f, "failed to read font {}: {}", path.display(), message)
            }
            Self::Invalid(path) => write!(f, "not a valid TrueType font: {}", path.display()),
            Self::Unregistered(name) => write!(f, "no font registered for {:?}", name),
        }
    }
}

impl std::error::Error for FontLoadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_reported_with_its_path() {
        let path = Path::new("definitely/not/here/Argent.ttf");
        let err = FontLibrary::load([("Argent", path)]).unwrap_err();
        assert_eq!(err, FontLoadError::Missing(path.to_path_buf()));
        assert!(err.to_string().contains("Argent.ttf"));
    }

    #[test]
    fn garbage_bytes_are_rejected_as_invalid() {
        let err = FontFace::from_bytes("Broken", "broken.ttf", b"not a font".to_vec()).unwrap_err();
        assert_eq!(err, FontLoadError::Invalid(PathBuf::from("broken.ttf")));
    }

    #[test]
    fn unparsable_file_on_disk_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.ttf");
        std::fs::write(&path, b"\0\x01\0\0 nope").unwrap();
        let err = FontLibrary::load([("Fake", path.as_path())]).unwrap_err();
        assert_eq!(err, FontLoadError::Invalid(path));
    }

    #[test]
    fn require_names_the_first_unregistered_font() {
        let library = FontLibrary::new();
        assert!(library.is_empty());
        assert_eq!(
            library.require(["Argent"]),
            Err(FontLoadError::Unregistered("Argent".to_string()))
        );
        assert_eq!(library.require([]), Ok(()));
    }

    #[test]
    fn unknown_face_measures_with_heuristic_fallback() {
        let library = FontLibrary::new();
        assert_eq!(
            library.measure_text("Rosół", "Argent", 12.0),
            HeuristicMeasurer.measure_text("Rosół", "Argent", 12.0)
        );
    }
}
