//! Gradient engine for gradwall.
//!
//! A [`Gradient`] is rendered along two independent paths that are expected to
//! agree visually:
//!
//! ```text
//!   Gradient ──▶ css::preview_css ──▶ "linear-gradient(135deg, ...)"   (live preview)
//!       │
//!       └──▶ raster::render ──▶ PixelBuffer ──▶ export::encode_png ──▶ gradient.png
//!                                                  export::clipboard_css ──▶ "background: ...;"
//! ```
//!
//! Every entry point is a pure function of the descriptor it is handed; there
//! is no cache and no state carried between calls.

pub mod color;
pub mod css;
pub mod descriptor;
pub mod export;
pub mod raster;

pub use color::{lerp, mix_hex, ParseError, Rgb};
pub use css::{preview_css, stop_list};
pub use descriptor::{
    sorted_stops, Atmosphere, ColorStop, Gradient, GradientKind, MeshStop, StopEditError,
    StopUpdate, ADDED_STOP_COLOR, MIN_STOPS,
};
pub use export::{clipboard_css, encode_png, Download, ExportError, DOWNLOAD_FILENAME};
pub use raster::{
    conic_sectors, render, ColorRamp, ConicSector, PixelBuffer, RasterConfig, RenderError,
    CONIC_SECTORS,
};

/// Any failure of a render-and-encode call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Renders and encodes in one step, the way the image export action does.
pub fn export_png(gradient: &Gradient, config: RasterConfig) -> Result<Download, Error> {
    let buffer = render(gradient, config)?;
    Ok(encode_png(&buffer)?)
}
