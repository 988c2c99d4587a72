//! Menu rendering entry points.

use core::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use menu_render_backend::{
    BackendError, FontLibrary, FontLoadError, PdfTarget, RasterTarget, RenderTarget,
};
use menu_render_layout::{CoordinateSystem, LayoutConfig, LayoutEngine, MenuEntry, MenuPage};

use crate::menu_data::{MenuDataError, MenuTable, UnknownDishes};
use crate::settings::{AppConfig, ConfigError, OutputFormat};

const PDF_TITLE: &str = "Menu";

/// Result of a successful render.
#[derive(Clone, Debug)]
pub struct RenderOutcome {
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Laid-out page in the target's coordinate system.
    pub page: MenuPage,
    /// Non-fatal problems encountered while rendering.
    pub warnings: Vec<RenderWarning>,
}

/// Non-fatal render condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderWarning {
    /// Configured background does not exist; a blank page was used.
    BackgroundMissing(PathBuf),
    /// Background exists but could not be decoded; a blank page was used.
    BackgroundUnreadable { path: PathBuf, message: String },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackgroundMissing(path) => {
                write!(f, "background {} not found; using a blank page", path.display())
            }
            Self::BackgroundUnreadable { path, message } => write!(
                f,
                "background {} unreadable ({}); using a blank page",
                path.display(),
                message
            ),
        }
    }
}

/// Read the menu table named by `config.data_file`.
pub fn load_menu_table(config: &AppConfig) -> Result<MenuTable, MenuRenderError> {
    Ok(MenuTable::load(&config.data_file)?)
}

/// Load every font referenced by `config.layout`.
pub fn load_fonts(config: &AppConfig) -> Result<FontLibrary, MenuRenderError> {
    let mut fonts = FontLibrary::new();
    for (name, path) in config.font_files() {
        fonts
            .load_file(&name, &path)
            .map_err(|err| font_error(&name, err))?;
    }
    Ok(fonts)
}

/// Render `selected` dishes, in order, to `config.output`.
///
/// Unknown dishes fail the request before fonts are read or any file is
/// written.
pub fn render_menu<S: AsRef<str>>(
    selected: &[S],
    table: &MenuTable,
    config: &AppConfig,
) -> Result<RenderOutcome, MenuRenderError> {
    config.validate()?;
    let entries = table.select(selected)?;
    let fonts = Arc::new(load_fonts(config)?);
    render_entries(entries, config, fonts)
}

/// Like [`render_menu`] with fonts loaded by the caller.
pub fn render_menu_with_fonts<S: AsRef<str>>(
    selected: &[S],
    table: &MenuTable,
    config: &AppConfig,
    fonts: Arc<FontLibrary>,
) -> Result<RenderOutcome, MenuRenderError> {
    config.validate()?;
    let entries = table.select(selected)?;
    if let Err(err) = fonts.require(config.layout.typography.font_names()) {
        return Err(match err {
            FontLoadError::Unregistered(name) => MenuRenderError::FontMissing {
                path: config.fonts.get(&name).cloned(),
                font: name,
            },
            other => MenuRenderError::InvalidFont(other),
        });
    }
    render_entries(entries, config, fonts)
}

fn render_entries(
    entries: Vec<MenuEntry>,
    config: &AppConfig,
    fonts: Arc<FontLibrary>,
) -> Result<RenderOutcome, MenuRenderError> {
    let format = config.output_format();
    log::info!(
        "rendering {} dishes as {} to {}",
        entries.len(),
        format,
        config.output.display()
    );
    let mut warnings = Vec::new();
    let page = match format {
        OutputFormat::Png => render_png(entries, config, fonts, &mut warnings)?,
        OutputFormat::Pdf => render_pdf(entries, config, fonts, &mut warnings)?,
    };
    Ok(RenderOutcome {
        output: config.output.clone(),
        format,
        page,
        warnings,
    })
}

fn render_png(
    entries: Vec<MenuEntry>,
    config: &AppConfig,
    fonts: Arc<FontLibrary>,
    warnings: &mut Vec<RenderWarning>,
) -> Result<MenuPage, MenuRenderError> {
    let background = match usable_background(config.background.as_deref(), warnings) {
        Some(path) => match RasterTarget::from_background(path, Arc::clone(&fonts)) {
            Ok(target) => Some(target),
            Err(err) => {
                push_unreadable(path, &err, warnings);
                None
            }
        },
        None => None,
    };

    // Only a background canvas rescales the layout; the blank fallback
    // is the reference page, rounded to whole pixels.
    let (mut target, layout): (RasterTarget, LayoutConfig) = match background {
        Some(target) => {
            let (width, height) = target.canvas_size();
            let layout = config.layout.scaled_to_canvas(width, height);
            (target, layout)
        }
        None => {
            let reference = &config.layout.page;
            let target = RasterTarget::blank(
                reference.width.round() as u32,
                reference.height.round() as u32,
                Arc::clone(&fonts),
            );
            (target, config.layout.clone())
        }
    };
    let engine = LayoutEngine::new(layout)
        .with_coordinate_system(target.coordinate_system())
        .with_text_measurer(fonts);
    let page = engine.layout_entries(entries);
    target.draw_page(&page).map_err(MenuRenderError::Output)?;
    target.finish(&config.output).map_err(MenuRenderError::Output)?;
    Ok(page)
}

fn render_pdf(
    entries: Vec<MenuEntry>,
    config: &AppConfig,
    fonts: Arc<FontLibrary>,
    warnings: &mut Vec<RenderWarning>,
) -> Result<MenuPage, MenuRenderError> {
    let reference = &config.layout.page;
    let blank = || {
        PdfTarget::new(
            PDF_TITLE,
            reference.width,
            reference.height,
            Arc::clone(&fonts),
        )
    };
    let mut target = match usable_background(config.background.as_deref(), warnings) {
        Some(path) => match blank().with_background(path) {
            Ok(target) => target,
            Err(err) => {
                push_unreadable(path, &err, warnings);
                blank()
            }
        },
        None => blank(),
    };

    let engine = LayoutEngine::new(config.layout.clone())
        .with_coordinate_system(CoordinateSystem::BottomUp)
        .with_text_measurer(fonts);
    let page = engine.layout_entries(entries);
    target.draw_page(&page).map_err(MenuRenderError::Output)?;
    target.finish(&config.output).map_err(MenuRenderError::Output)?;
    Ok(page)
}

/// Configured background if it exists; records a warning otherwise.
fn usable_background<'a>(
    background: Option<&'a Path>,
    warnings: &mut Vec<RenderWarning>,
) -> Option<&'a Path> {
    let path = background?;
    if path.is_file() {
        return Some(path);
    }
    log::warn!("background {} not found; using a blank page", path.display());
    warnings.push(RenderWarning::BackgroundMissing(path.to_path_buf()));
    None
}

fn push_unreadable(path: &Path, err: &BackendError, warnings: &mut Vec<RenderWarning>) {
    log::warn!("background {} unreadable: {}", path.display(), err);
    warnings.push(RenderWarning::BackgroundUnreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    });
}

fn font_error(name: &str, err: FontLoadError) -> MenuRenderError {
    match err {
        FontLoadError::Missing(path) => MenuRenderError::FontMissing {
            font: name.to_string(),
            path: Some(path),
        },
        other => MenuRenderError::InvalidFont(other),
    }
}

/// Coarse classification of [`MenuRenderError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderErrorKind {
    UnknownDish,
    FontMissing,
    DataSourceMissing,
    InvalidData,
    InvalidFont,
    InvalidConfig,
    Output,
}

impl RenderErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownDish => "unknown_dish",
            Self::FontMissing => "font_missing",
            Self::DataSourceMissing => "data_source_missing",
            Self::InvalidData => "invalid_data",
            Self::InvalidFont => "invalid_font",
            Self::InvalidConfig => "invalid_config",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Menu render failure.
#[derive(Debug)]
pub enum MenuRenderError {
    UnknownDish(UnknownDishes),
    FontMissing {
        font: String,
        path: Option<PathBuf>,
    },
    DataSourceMissing(PathBuf),
    InvalidData(MenuDataError),
    InvalidFont(FontLoadError),
    InvalidConfig(ConfigError),
    Output(BackendError),
}

impl MenuRenderError {
    pub fn kind(&self) -> RenderErrorKind {
        match self {
            Self::UnknownDish(_) => RenderErrorKind::UnknownDish,
            Self::FontMissing { .. } => RenderErrorKind::FontMissing,
            Self::DataSourceMissing(_) => RenderErrorKind::DataSourceMissing,
            Self::InvalidData(_) => RenderErrorKind::InvalidData,
            Self::InvalidFont(_) => RenderErrorKind::InvalidFont,
            Self::InvalidConfig(_) => RenderErrorKind::InvalidConfig,
            Self::Output(_) => RenderErrorKind::Output,
        }
    }
}

impl fmt::Display for MenuRenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDish(err) => write!(f, "{}", err),
            Self::FontMissing {
                font,
                path: Some(path),
            } => write!(f, "font {:?} not found at {}", font, path.display()),
            Self::FontMissing { font, path: None } => {
                write!(f, "font {:?} is not configured", font)
            }
            Self::DataSourceMissing(path) => {
                write!(f, "menu data {} not found", path.display())
            }
            Self::InvalidData(err) => write!(f, "{}", err),
            Self::InvalidFont(err) => write!(f, "{}", err),
            Self::InvalidConfig(err) => write!(f, "{}", err),
            Self::Output(err) => write!(f, "failed to write menu: {}", err),
        }
    }
}

impl std::error::Error for MenuRenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownDish(err) => Some(err),
            Self::InvalidData(err) => Some(err),
            Self::InvalidFont(err) => Some(err),
            Self::InvalidConfig(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::FontMissing { .. } | Self::DataSourceMissing(_) => None,
        }
    }
}

impl From<UnknownDishes> for MenuRenderError {
    fn from(value: UnknownDishes) -> Self {
        Self::UnknownDish(value)
    }
}

impl From<MenuDataError> for MenuRenderError {
    fn from(value: MenuDataError) -> Self {
        match value {
            MenuDataError::Missing(path) => Self::DataSourceMissing(path),
            other => Self::InvalidData(other),
        }
    }
}

impl From<ConfigError> for MenuRenderError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}
