//! Application settings: where data, fonts and output live, plus layout.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use menu_render_layout::{LayoutConfig, LayoutConfigError, DEFAULT_FONT};

pub const DEFAULT_DATA_FILE: &str = "menu_data.json";
pub const DEFAULT_FONT_FILE: &str = "fonts/Argent.ttf";
pub const DEFAULT_BACKGROUND: &str = "restaurant_menu_project/menu_background.png";
pub const DEFAULT_OUTPUT: &str = "menu_output.png";

/// Output file format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Pdf,
}

impl OutputFormat {
    /// Format implied by a file extension, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Top-level application configuration.
///
/// Every field is optional in JSON; relative paths resolve against the
/// working directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_file: PathBuf,
    /// Font name used in `layout.typography` mapped to a TrueType file.
    pub fonts: BTreeMap<String, PathBuf>,
    /// Page background; rendering continues on a blank page when absent.
    pub background: Option<PathBuf>,
    pub output: PathBuf,
    /// Explicit output format; inferred from `output` when unset.
    pub format: Option<OutputFormat>,
    pub layout: LayoutConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut fonts = BTreeMap::new();
        fonts.insert(DEFAULT_FONT.to_string(), PathBuf::from(DEFAULT_FONT_FILE));
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            fonts,
            background: Some(PathBuf::from(DEFAULT_BACKGROUND)),
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no settings at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let cfg = Self::from_json_slice(&bytes)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(cfg)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_slice(bytes).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        if let (Some(explicit), Some(implied)) = (self.format, OutputFormat::from_path(&self.output))
        {
            if explicit != implied {
                log::warn!(
                    "output {} has a .{} extension but format is {}",
                    self.output.display(),
                    implied,
                    explicit
                );
            }
        }
        Ok(())
    }

    /// Explicit format, else the output extension, else PNG.
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .or_else(|| OutputFormat::from_path(&self.output))
            .unwrap_or_default()
    }

    /// `(name, path)` for every font the layout references.
    ///
    /// Names without a configured file are returned with a path derived from
    /// the font name (`fonts/<name>.ttf`) so the load reports it as missing.
    pub fn font_files(&self) -> Vec<(String, PathBuf)> {
        self.layout
            .typography
            .font_names()
            .into_iter()
            .map(|name| {
                let path = self
                    .fonts
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(format!("fonts/{name}.ttf")));
                (name.to_string(), path)
            })
            .collect()
    }
}

/// Settings error.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse(String),
    UnknownFormat(String),
    Layout(LayoutConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "failed to read settings {}: {}", path.display(), message)
            }
            Self::Parse(err) => write!(f, "invalid settings: {}", err),
            Self::UnknownFormat(format) => {
                write!(f, "unknown output format {:?} (expected png or pdf)", format)
            }
            Self::Layout(err) => write!(f, "invalid layout: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayoutConfigError> for ConfigError {
    fn from(value: LayoutConfigError) -> Self {
        Self::Layout(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_setup() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_file, PathBuf::from("menu_data.json"));
        assert_eq!(
            cfg.fonts.get("Argent"),
            Some(&PathBuf::from("fonts/Argent.ttf"))
        );
        assert_eq!(cfg.output_format(), OutputFormat::Png);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let cfg = AppConfig::from_json_slice(
            br#"{ "output": "out/menu.PDF", "background": null, "layout": { "max_width": 300.0 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.output_format(), OutputFormat::Pdf);
        assert_eq!(cfg.background, None);
        assert_eq!(cfg.layout.max_width, 300.0);
        assert_eq!(cfg.layout.page, LayoutConfig::default().page);
        assert_eq!(cfg.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        let cfg = AppConfig {
            output: PathBuf::from("menu.png"),
            format: Some(OutputFormat::Pdf),
            ..AppConfig::default()
        };
        assert_eq!(cfg.output_format(), OutputFormat::Pdf);
    }

    #[test]
    fn unrecognized_extension_falls_back_to_png() {
        let cfg = AppConfig {
            output: PathBuf::from("menu.out"),
            ..AppConfig::default()
        };
        assert_eq!(cfg.output_format(), OutputFormat::Png);
        assert!(matches!(
            "svg".parse::<OutputFormat>(),
            Err(ConfigError::UnknownFormat(_))
        ));
    }

    #[test]
    fn invalid_layout_is_reported() {
        let err = AppConfig::from_json_slice(br#"{ "layout": { "max_width": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Layout(_)));
    }

    #[test]
    fn missing_settings_file_uses_defaults() {
        let cfg = AppConfig::load(Path::new("no/such/settings.json")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn font_files_cover_every_layout_font() {
        let mut cfg = AppConfig::default();
        cfg.layout.typography.title.font = "Script".to_string();
        let files = cfg.font_files();
        assert!(files.contains(&("Argent".to_string(), PathBuf::from("fonts/Argent.ttf"))));
        assert!(files.contains(&("Script".to_string(), PathBuf::from("fonts/Script.ttf"))));
    }
}
