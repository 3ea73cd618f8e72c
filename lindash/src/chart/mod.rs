//! Pure chart rendering: viewport math, downsampling, draw commands and caching.

pub mod cache;
pub mod downsample;
pub mod draw;
pub mod render;
pub mod style;
pub mod viewport;

pub use cache::{RenderCache, RenderKey};
pub use draw::{DrawCommand, DrawCommandList, Layer, Rgba, TextAlign};
pub use render::{ChartRenderer, Overlay, render, resolve_value_range};
pub use style::{ChartStyle, Padding};
pub use viewport::{Rect, Scale, ValueRange, Viewport};
