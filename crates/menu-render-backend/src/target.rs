use core::fmt;
use menu_render_layout::{CoordinateSystem, DrawCommand, MenuPage, TextCommand};
use std::io;
use std::path::Path;

use crate::font::FontLoadError;

/// Drawing capability of one output format.
pub trait RenderTarget {
    /// Native vertical convention; fixed for the lifetime of the target.
    fn coordinate_system(&self) -> CoordinateSystem;

    /// Drawable size in page units.
    fn canvas_size(&self) -> (f32, f32);

    /// Draw one resolved text command.
    fn draw_text(&mut self, cmd: &TextCommand) -> Result<(), BackendError>;

    /// Serialize the finished output to `path`.
    fn finish(self, path: &Path) -> Result<(), BackendError>
    where
        Self: Sized;

    /// Draw every command of a laid-out page in order.
    fn draw_page(&mut self, page: &MenuPage) -> Result<(), BackendError> {
        if page.coordinate_system != self.coordinate_system() {
            return Err(BackendError::CoordinateMismatch {
                page: page.coordinate_system,
                target: self.coordinate_system(),
            });
        }
        for cmd in &page.commands {
            match cmd {
                DrawCommand::Text(text) => self.draw_text(text)?,
            }
        }
        Ok(())
    }
}

/// Render backend error.
#[derive(Debug)]
pub enum BackendError {
    /// Font lookup or loading failed.
    Font(FontLoadError),
    /// Background decode or PNG encode failed.
    Image(image::ImageError),
    /// PDF assembly or serialization failed.
    Pdf(String),
    /// Output file could not be written.
    Io(io::Error),
    /// A page laid out for one coordinate system was sent to another target.
    CoordinateMismatch {
        page: CoordinateSystem,
        target: CoordinateSystem,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Font(err) => write!(f, "font error: {}", err),
            Self::Image(err) => write!(f, "image error: {}", err),
            Self::Pdf(err) => write!(f, "pdf error: {}", err),
            Self::Io(err) => write!(f, "output error: {}", err),
            Self::CoordinateMismatch { page, target } => write!(
                f,
                "page laid out for {:?} coordinates cannot be drawn on a {:?} target",
                page, target
            ),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Font(err) => Some(err),
            Self::Image(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Pdf(_) | Self::CoordinateMismatch { .. } => None,
        }
    }
}

impl From<FontLoadError> for BackendError {
    fn from(value: FontLoadError) -> Self {
        Self::Font(value)
    }
}

impl From<image::ImageError> for BackendError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value)
    }
}

impl From<io::Error> for BackendError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
