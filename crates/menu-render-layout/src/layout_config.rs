use core::fmt;
use serde::{Deserialize, Serialize};

use crate::layout_ir::Color;

/// Reference page size the layout constants are authored against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl Default for PageSize {
    fn default() -> Self {
        // A5 in points.
        Self {
            width: 419.25,
            height: 595.5,
        }
    }
}

/// Region of the page reserved for menu text, in top-down units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentArea {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y_top: f32,
    pub width: f32,
    pub height: f32,
}

impl ContentArea {
    pub fn bottom(&self) -> f32 {
        self.y_top + self.height
    }
}

impl Default for ContentArea {
    fn default() -> Self {
        Self {
            x: 24.0,
            y_top: 50.0,
            width: 371.25,
            height: 555.5,
        }
    }
}

/// Font, size and color for one block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font reference resolved by the backend.
    pub font: String,
    pub size: f32,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(DEFAULT_FONT, 12.0, Color::BLACK)
    }
}

impl TextStyle {
    pub fn new(font: impl Into<String>, size: f32, color: Color) -> Self {
        Self {
            font: font.into(),
            size,
            color,
        }
    }
}

/// Per-block typography.
///
/// Deserializes per field: a style that names only `size` keeps its role's
/// default font and color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TypographyOverrides")]
pub struct Typography {
    pub title: TextStyle,
    pub name: TextStyle,
    pub desc: TextStyle,
}

impl Typography {
    /// Distinct font references in title/name/desc order.
    pub fn font_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(3);
        for style in [&self.title, &self.name, &self.desc] {
            if !out.contains(&style.font.as_str()) {
                out.push(style.font.as_str());
            }
        }
        out
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title: TextStyle::new(DEFAULT_FONT, 25.0, Color::rgb(0xaa, 0x86, 0x00)),
            name: TextStyle::new(DEFAULT_FONT, 17.0, Color::BLACK),
            desc: TextStyle::new(DEFAULT_FONT, 12.0, Color::BLACK),
        }
    }
}

/// Optional fields of one style, laid over a role default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StyleOverride {
    font: Option<String>,
    size: Option<f32>,
    color: Option<Color>,
}

impl StyleOverride {
    fn apply(self, base: TextStyle) -> TextStyle {
        TextStyle {
            font: self.font.unwrap_or(base.font),
            size: self.size.unwrap_or(base.size),
            color: self.color.unwrap_or(base.color),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TypographyOverrides {
    title: StyleOverride,
    name: StyleOverride,
    desc: StyleOverride,
}

impl From<TypographyOverrides> for Typography {
    fn from(value: TypographyOverrides) -> Self {
        let base = Typography::default();
        Self {
            title: value.title.apply(base.title),
            name: value.name.apply(base.name),
            desc: value.desc.apply(base.desc),
        }
    }
}

/// Vertical spacing constants, in top-down units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    /// Extra gap between a category title and its first dish.
    pub title_break_after: f32,
    /// Advance for the category title line.
    pub title_line: f32,
    /// Advance for a dish name line.
    pub name_line: f32,
    /// Advance per wrapped description line.
    pub desc_line: f32,
    /// Gap after each dish.
    pub dish_gap: f32,
    /// Gap after each category.
    pub category_gap: f32,
    /// Starting cursor for top alignment.
    pub first_baseline_y_top: f32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            title_break_after: 8.0,
            title_line: 28.0,
            name_line: 25.0,
            desc_line: 14.5,
            dish_gap: 10.0,
            category_gap: 10.0,
            first_baseline_y_top: 110.0,
        }
    }
}

/// Vertical placement of the whole menu block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    /// Start at `spacing.first_baseline_y_top`.
    Top,
    /// Center within the content area (or on `middle_y` when set).
    #[default]
    Middle,
}

pub const DEFAULT_FONT: &str = "Argent";

/// Layout configuration for menu construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: PageSize,
    pub content: ContentArea,
    pub typography: Typography,
    pub spacing: Spacing,
    /// Maximum text width.
    pub max_width: f32,
    /// Subtracted from `max_width` when wrapping descriptions.
    pub desc_indent_allowance: f32,
    pub vertical_align: VerticalAlign,
    /// Explicit centering anchor for [`VerticalAlign::Middle`].
    pub middle_y: Option<f32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageSize::default(),
            content: ContentArea::default(),
            typography: Typography::default(),
            spacing: Spacing::default(),
            max_width: 371.25,
            desc_indent_allowance: 40.0,
            vertical_align: VerticalAlign::Middle,
            middle_y: None,
        }
    }
}

impl LayoutConfig {
    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, LayoutConfigError> {
        let cfg: Self = serde_json::from_slice(bytes)
            .map_err(|err| LayoutConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Width descriptions are wrapped at.
    pub fn desc_wrap_width(&self) -> f32 {
        self.max_width - self.desc_indent_allowance
    }

    /// Copy with every linear quantity multiplied by its axis factor.
    ///
    /// Horizontal quantities use `sx`; vertical quantities and font sizes use `sy`.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        let scale_style = |style: &TextStyle| TextStyle {
            size: style.size * sy,
            ..style.clone()
        };
        Self {
            page: PageSize {
                width: self.page.width * sx,
                height: self.page.height * sy,
            },
            content: ContentArea {
                x: self.content.x * sx,
                y_top: self.content.y_top * sy,
                width: self.content.width * sx,
                height: self.content.height * sy,
            },
            typography: Typography {
                title: scale_style(&self.typography.title),
                name: scale_style(&self.typography.name),
                desc: scale_style(&self.typography.desc),
            },
            spacing: Spacing {
                title_break_after: self.spacing.title_break_after * sy,
                title_line: self.spacing.title_line * sy,
                name_line: self.spacing.name_line * sy,
                desc_line: self.spacing.desc_line * sy,
                dish_gap: self.spacing.dish_gap * sy,
                category_gap: self.spacing.category_gap * sy,
                first_baseline_y_top: self.spacing.first_baseline_y_top * sy,
            },
            max_width: self.max_width * sx,
            desc_indent_allowance: self.desc_indent_allowance * sx,
            vertical_align: self.vertical_align,
            middle_y: self.middle_y.map(|m| m * sy),
        }
    }

    /// Copy scaled from the reference page to a canvas of the given size.
    pub fn scaled_to_canvas(&self, canvas_width: f32, canvas_height: f32) -> Self {
        let sx = canvas_width / self.page.width;
        let sy = canvas_height / self.page.height;
        if (sx - 1.0).abs() <= f32::EPSILON && (sy - 1.0).abs() <= f32::EPSILON {
            return self.clone();
        }
        log::debug!("scaling layout by ({sx:.4}, {sy:.4}) for {canvas_width}x{canvas_height} canvas");
        self.scaled(sx, sy)
    }

    /// Reject sizes the engine cannot lay out with.
    pub fn validate(&self) -> Result<(), LayoutConfigError> {
        let positive = [
            ("page.width", self.page.width),
            ("page.height", self.page.height),
            ("content.width", self.content.width),
            ("content.height", self.content.height),
            ("typography.title.size", self.typography.title.size),
            ("typography.name.size", self.typography.name.size),
            ("typography.desc.size", self.typography.desc.size),
            ("max_width", self.max_width),
            ("max_width - desc_indent_allowance", self.desc_wrap_width()),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutConfigError::NonPositive { field, value });
            }
        }
        let finite = [
            ("content.x", self.content.x),
            ("content.y_top", self.content.y_top),
            ("spacing.title_break_after", self.spacing.title_break_after),
            ("spacing.title_line", self.spacing.title_line),
            ("spacing.name_line", self.spacing.name_line),
            ("spacing.desc_line", self.spacing.desc_line),
            ("spacing.dish_gap", self.spacing.dish_gap),
            ("spacing.category_gap", self.spacing.category_gap),
            ("spacing.first_baseline_y_top", self.spacing.first_baseline_y_top),
            ("middle_y", self.middle_y.unwrap_or(0.0)),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(LayoutConfigError::NonFinite { field, value });
            }
        }
        for style in [
            &self.typography.title,
            &self.typography.name,
            &self.typography.desc,
        ] {
            if style.font.trim().is_empty() {
                return Err(LayoutConfigError::EmptyFontName);
            }
        }
        Ok(())
    }
}

/// Layout configuration error.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutConfigError {
    /// JSON payload could not be decoded.
    Parse(String),
    /// A size that must be strictly positive was not.
    NonPositive { field: &'static str, value: f32 },
    /// A coordinate or spacing value was NaN or infinite.
    NonFinite { field: &'static str, value: f32 },
    /// A text style names no font.
    EmptyFontName,
}

impl fmt::Display for LayoutConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid layout config: {}", err),
            Self::NonPositive { field, value } => {
                write!(f, "layout value {} must be positive (got {})", field, value)
            }
            Self::NonFinite { field, value } => {
                write!(f, "layout value {} must be finite (got {})", field, value)
            }
            Self::EmptyFontName => write!(f, "text style has an empty font name"),
        }
    }
}

impl std::error::Error for LayoutConfigError {}
