#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]
//! Restaurant menu renderer.
//!
//! Picks dishes from a menu table, groups them by category, lays them out
//! centered on a fixed reference page and writes a PNG or PDF.
//!
//! ```no_run
//! use menu_render::{load_menu_table, render_menu, AppConfig};
//!
//! let config = AppConfig::default();
//! let table = load_menu_table(&config)?;
//! let outcome = render_menu(&["Rosół", "Schabowy", "Sernik"], &table, &config)?;
//! println!("saved {}", outcome.output.display());
//! # Ok::<(), menu_render::MenuRenderError>(())
//! ```

mod command;
mod menu_data;
mod render;
mod session;
mod settings;

pub use command::{
    accepted_reply, parse_command, ready_reply, CommandError, MenuCommand, REPLY_PREFIX,
    WELCOME_TEXT,
};
pub use menu_data::{MenuDataError, MenuTable, UnknownDishes};
pub use render::{
    load_fonts, load_menu_table, render_menu, render_menu_with_fonts, MenuRenderError,
    RenderErrorKind, RenderOutcome, RenderWarning,
};
pub use session::MenuSession;
pub use settings::{
    AppConfig, ConfigError, OutputFormat, DEFAULT_BACKGROUND, DEFAULT_DATA_FILE,
    DEFAULT_FONT_FILE, DEFAULT_OUTPUT,
};

pub use menu_render_backend::{
    BackendError, FontFace, FontLibrary, FontLoadError, PdfTarget, RasterTarget, RenderTarget,
};
pub use menu_render_layout::{
    BlockRole, CategoryGroup, Color, CoordinateSystem, LayoutConfig, LayoutConfigError,
    LayoutEngine, LayoutMetrics, MenuEntry, MenuPage, TextCommand, TextMeasurer,
};
