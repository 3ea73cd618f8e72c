//! LinDash - synchronized canvas time-series charts for LinDB dashboards.
//!
//! The chart core is UI-free: [`model`] normalizes query results,
//! [`chart`] turns a model and viewport into draw commands,
//! [`interaction`] maps pointer and key input to zoom and hover changes,
//! [`sync_bus`] shares hover and zoom between charts of a group and
//! [`tooltip`] builds the hover readout. [`dashboard`] wires these
//! together for a set of mounted charts; [`app`] and [`view`] present them
//! with Iced.

pub mod app;
pub mod chart;
pub mod dashboard;
pub mod demo;
pub mod formatting;
pub mod instance;
pub mod interaction;
pub mod message;
pub mod model;
pub mod redraw;
pub mod status;
pub mod subscription;
pub mod sync_bus;
pub mod tooltip;
pub mod view;

// Re-export commonly used types
pub use app::{LinDash, Settings};
pub use dashboard::Dashboard;
pub use instance::{ChartInstance, LegendEntry, RenderedFrame};
pub use interaction::{InputEvent, InteractionController, InteractionState, Key};
pub use message::Message;
pub use model::{DataShapeError, TimeRange, TimeSeriesModel};
pub use status::ChartStatus;
pub use sync_bus::{ChartId, HoverState, SyncBus};
pub use tooltip::{TooltipContent, TooltipPresenter};
