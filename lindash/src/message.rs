use crate::interaction::InputEvent;
use crate::sync_bus::ChartId;

/// Messages for the LinDash application.
#[derive(Debug, Clone)]
pub enum Message {
    /// Pointer or keyboard input on a chart canvas, with the canvas size
    /// the event was measured against.
    Input(ChartId, InputEvent, (f32, f32)),

    /// A chart canvas was laid out with a new size and no input came with it.
    Resized(ChartId, f32, f32),

    /// User toggled a series in a chart legend.
    ToggleSeries(ChartId, String),

    /// User toggled shared zoom for the dashboard group.
    ToggleLinkedZoom,

    /// Periodic data refresh.
    Refresh,
}
