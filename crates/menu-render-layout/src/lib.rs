//! Layout IR and text-flow engine for `menu-render`.

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

mod layout_config;
mod layout_engine;
mod layout_ir;

pub use layout_config::{
    ContentArea, LayoutConfig, LayoutConfigError, PageSize, Spacing, TextStyle, Typography,
    VerticalAlign, DEFAULT_FONT,
};
pub use layout_engine::{
    group_by_category, HeuristicMeasurer, LayoutCursor, LayoutEngine, TextMeasurer,
};
pub use layout_ir::{
    BlockRole, CategoryGroup, Color, ColorParseError, CoordinateSystem, DrawCommand,
    LayoutMetrics, MenuEntry, MenuPage, TextCommand,
};
