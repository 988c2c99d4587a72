//! TrueType measurement plus PNG and PDF render targets for `menu-render-layout` pages.

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

mod font;
mod pdf;
mod raster;
mod target;

pub use font::{FontFace, FontLibrary, FontLoadError};
pub use pdf::PdfTarget;
pub use raster::RasterTarget;
pub use target::{BackendError, RenderTarget};
