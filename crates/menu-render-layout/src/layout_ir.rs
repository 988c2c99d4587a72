use core::fmt;
use serde::{Deserialize, Serialize};

/// One dish row as consumed by layout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Dish name, unique within a menu table.
    pub name: String,
    /// Category label used for grouping.
    pub category: String,
    /// Free-form description, word-wrapped during layout.
    pub description: String,
}

impl MenuEntry {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
        }
    }
}

/// Category label plus its entries in requested order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub entries: Vec<MenuEntry>,
}

/// Semantic role of a laid-out text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
    CategoryTitle,
    DishName,
    Description,
}

impl BlockRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CategoryTitle => "category_title",
            Self::DishName => "dish_name",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for BlockRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let hex = value.trim().trim_start_matches('#');
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return Err(ColorParseError(value.to_string()));
        }
        let channel = |idx: usize| {
            u8::from_str_radix(&hex[idx..idx + 2], 16)
                .map_err(|_| ColorParseError(value.to_string()))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }

    /// Channel values normalized to `[0.0, 1.0]`.
    pub fn to_unit_rgb(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// Rejected color literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color literal: {:?}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

/// Native vertical convention of a render target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CoordinateSystem {
    /// Origin top-left, y grows downward (raster images).
    #[default]
    TopDown,
    /// Origin bottom-left, y grows upward (PDF pages).
    BottomUp,
}

impl CoordinateSystem {
    /// Map a top-down cursor position into this system.
    pub fn map_y(self, y_top: f32, page_height: f32) -> f32 {
        match self {
            Self::TopDown => y_top,
            Self::BottomUp => page_height - y_top,
        }
    }
}

/// Text draw command.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCommand {
    /// Left x.
    pub x: f32,
    /// Line origin y in the page's coordinate system.
    pub y: f32,
    /// Content.
    pub text: String,
    /// Font reference (name registered with the backend).
    pub font: String,
    /// Font size in page units.
    pub size: f32,
    pub color: Color,
    pub role: BlockRole,
}

/// Layout output commands.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Draw text.
    Text(TextCommand),
}

impl DrawCommand {
    pub fn as_text(&self) -> Option<&TextCommand> {
        match self {
            Self::Text(cmd) => Some(cmd),
        }
    }
}

/// Vertical extent bookkeeping for one layout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutMetrics {
    /// Height computed by the dry-run pass.
    pub total_height: f32,
    /// Resolved top-down starting cursor.
    pub start_y: f32,
    /// Cursor after the draw pass.
    pub end_y: f32,
    /// Number of text lines emitted.
    pub line_count: usize,
    /// Block extends past the bottom of the content area.
    pub overflow: bool,
}

/// Page represented as backend-agnostic draw commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MenuPage {
    pub width: f32,
    pub height: f32,
    pub coordinate_system: CoordinateSystem,
    pub commands: Vec<DrawCommand>,
    pub metrics: LayoutMetrics,
}

impl MenuPage {
    /// Create an empty page.
    pub fn new(width: f32, height: f32, coordinate_system: CoordinateSystem) -> Self {
        Self {
            width,
            height,
            coordinate_system,
            // Keep the command vector lazy so empty menus avoid heap traffic.
            commands: Vec::with_capacity(0),
            metrics: LayoutMetrics::default(),
        }
    }

    pub fn push_command(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    /// Iterate text commands in draw order.
    pub fn text_commands(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(DrawCommand::as_text)
    }

    /// Text commands with the given role, in draw order.
    pub fn texts_with_role(&self, role: BlockRole) -> impl Iterator<Item = &TextCommand> {
        self.text_commands().filter(move |cmd| cmd.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockRole, Color, CoordinateSystem, DrawCommand, MenuPage, TextCommand};

    #[test]
    fn color_parses_hex_with_and_without_alpha() {
        assert_eq!(Color::from_hex("#aa8600"), Ok(Color::rgb(0xaa, 0x86, 0x00)));
        let translucent = Color::from_hex("11223380").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_string(), "#11223380");
        assert_eq!(Color::BLACK.to_string(), "#000000");
    }

    #[test]
    fn color_rejects_malformed_literals() {
        assert!(Color::from_hex("#abc").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("#ąą0000").is_err());
    }

    #[test]
    fn color_round_trips_through_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(0xaa, 0x86, 0)).unwrap();
        assert_eq!(json, "\"#aa8600\"");
        let err = serde_json::from_str::<Color>("\"blue\"");
        assert!(err.is_err());
    }

    #[test]
    fn bottom_up_mapping_flips_against_page_height() {
        assert_eq!(CoordinateSystem::TopDown.map_y(110.0, 595.5), 110.0);
        assert_eq!(CoordinateSystem::BottomUp.map_y(110.0, 595.5), 485.5);
    }

    #[test]
    fn menu_page_new_defers_command_allocation() {
        let mut page = MenuPage::new(100.0, 200.0, CoordinateSystem::TopDown);
        assert_eq!(page.commands.capacity(), 0);
        page.push_command(DrawCommand::Text(TextCommand {
            x: 0.0,
            y: 0.0,
            text: "Soups".to_string(),
            font: "serif".to_string(),
            size: 12.0,
            color: Color::BLACK,
            role: BlockRole::CategoryTitle,
        }));
        assert_eq!(page.texts_with_role(BlockRole::CategoryTitle).count(), 1);
        assert_eq!(page.texts_with_role(BlockRole::DishName).count(), 0);
    }
}
