//! Per-chart pointer/keyboard state machine.
//!
//! ```text
//! Idle --enter--> Hovering --press--> Panning --release--> Hovering | Idle
//!                    |  \--press+mod--> ZoomSelecting --release--> Idle
//!                    \--leave--> Idle
//! any --double click / reset--> Idle (viewport reset)
//! ```

use crate::chart::viewport::{Rect, Scale, ValueRange, Viewport};
use crate::model::{TimeRange, Timestamp};

/// Input delivered to a chart, in widget-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerEntered { x: f32, y: f32 },
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    /// `modifier` selects box zoom instead of panning.
    PointerPressed { x: f32, y: f32, modifier: bool },
    PointerReleased { x: f32, y: f32 },
    DoubleClick,
    /// Wheel lines; positive zooms in.
    Scrolled { x: f32, lines: f32 },
    Key(Key),
}

/// Keys the chart reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Reset,
    Left,
    Right,
}

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering { x: f32, y: f32 },
    Panning { last_x: f32 },
    ZoomSelecting { start: (f32, f32), current: (f32, f32) },
}

/// Change to the shared hover time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverUpdate {
    Set(Timestamp),
    Clear,
}

/// Effects of one input event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Response {
    pub hover: Option<HoverUpdate>,
    pub viewport: Option<Viewport>,
}

impl Response {
    fn hover(update: HoverUpdate) -> Self {
        Self {
            hover: Some(update),
            viewport: None,
        }
    }

    fn viewport(viewport: Viewport) -> Self {
        Self {
            hover: None,
            viewport: Some(viewport),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hover.is_none() && self.viewport.is_none()
    }
}

/// What the controller needs to know about the chart for one event.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext {
    pub scale: Scale,
    pub viewport: Viewport,
    /// Declared range of the model; pan/zoom never leave it.
    pub bounds: TimeRange,
}

const WHEEL_STEP: f64 = 0.8;
const KEY_PAN_FRACTION: f64 = 0.1;

/// Gesture state machine of one chart.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    zoom_min_pixels: f32,
}

impl InteractionController {
    pub fn new(zoom_min_pixels: f32) -> Self {
        Self {
            state: InteractionState::Idle,
            zoom_min_pixels: zoom_min_pixels.max(1.0),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Current zoom rectangle, if a box selection is in progress.
    pub fn selection(&self) -> Option<Rect> {
        match self.state {
            InteractionState::ZoomSelecting { start, current } => {
                Some(Rect::from_corners(start, current))
            }
            _ => None,
        }
    }

    /// Advance the state machine.
    pub fn handle(&mut self, event: InputEvent, ctx: &InteractionContext) -> Response {
        let plot = ctx.scale.plot;

        match (self.state, event) {
            (_, InputEvent::DoubleClick) | (_, InputEvent::Key(Key::Reset)) => {
                self.state = InteractionState::Idle;
                let mut response = Response::viewport(Viewport::full(ctx.bounds));
                response.hover = Some(HoverUpdate::Clear);
                response
            }

            (_, InputEvent::PointerLeft) => {
                let was_idle = self.state == InteractionState::Idle;
                self.state = InteractionState::Idle;
                if was_idle {
                    Response::default()
                } else {
                    Response::hover(HoverUpdate::Clear)
                }
            }

            (
                InteractionState::Idle | InteractionState::Hovering { .. },
                InputEvent::PointerEntered { x, y } | InputEvent::PointerMoved { x, y },
            ) => {
                if plot.contains(x, y) {
                    self.state = InteractionState::Hovering { x, y };
                    Response::hover(HoverUpdate::Set(ctx.scale.x_to_time(x)))
                } else if matches!(self.state, InteractionState::Hovering { .. }) {
                    self.state = InteractionState::Idle;
                    Response::hover(HoverUpdate::Clear)
                } else {
                    Response::default()
                }
            }

            (
                InteractionState::Idle | InteractionState::Hovering { .. },
                InputEvent::PointerPressed { x, y, modifier },
            ) => {
                if !plot.contains(x, y) {
                    return Response::default();
                }
                self.state = if modifier {
                    InteractionState::ZoomSelecting {
                        start: (x, y),
                        current: (x, y),
                    }
                } else {
                    InteractionState::Panning { last_x: x }
                };
                Response::default()
            }

            (InteractionState::Panning { last_x }, InputEvent::PointerMoved { x, .. }) => {
                self.state = InteractionState::Panning { last_x: x };
                let delta_ms = (-(x - last_x) as f64 * ctx.scale.ms_per_pixel()).round() as i64;
                if delta_ms == 0 {
                    return Response::default();
                }
                let panned = ctx.viewport.panned(delta_ms, ctx.bounds);
                if panned == ctx.viewport {
                    Response::default()
                } else {
                    Response::viewport(panned)
                }
            }

            (InteractionState::Panning { .. }, InputEvent::PointerReleased { x, y }) => {
                if plot.contains(x, y) {
                    self.state = InteractionState::Hovering { x, y };
                    Response::hover(HoverUpdate::Set(ctx.scale.x_to_time(x)))
                } else {
                    self.state = InteractionState::Idle;
                    Response::hover(HoverUpdate::Clear)
                }
            }

            (InteractionState::ZoomSelecting { start, .. }, InputEvent::PointerMoved { x, y }) => {
                let current = (x.clamp(plot.x, plot.right()), y.clamp(plot.y, plot.bottom()));
                self.state = InteractionState::ZoomSelecting { start, current };
                Response::default()
            }

            (InteractionState::ZoomSelecting { start, .. }, InputEvent::PointerReleased { x, y }) => {
                self.state = InteractionState::Idle;
                let end = (x.clamp(plot.x, plot.right()), y.clamp(plot.y, plot.bottom()));
                match self.commit_selection(Rect::from_corners(start, end), ctx) {
                    Some(viewport) => Response::viewport(viewport),
                    None => Response::default(),
                }
            }

            (InteractionState::ZoomSelecting { start, .. }, InputEvent::Key(Key::Escape)) => {
                self.state = InteractionState::Hovering {
                    x: start.0,
                    y: start.1,
                };
                Response::default()
            }

            (
                InteractionState::Idle | InteractionState::Hovering { .. },
                InputEvent::Scrolled { x, lines },
            ) => {
                if lines == 0.0 {
                    return Response::default();
                }
                let factor = WHEEL_STEP.powf(lines as f64);
                let anchor = ctx.scale.x_to_time(x);
                let zoomed = ctx.viewport.zoomed(factor, anchor, ctx.bounds);
                if zoomed == ctx.viewport {
                    Response::default()
                } else {
                    Response::viewport(zoomed)
                }
            }

            (
                InteractionState::Idle | InteractionState::Hovering { .. },
                InputEvent::Key(key @ (Key::Left | Key::Right)),
            ) => {
                let step = (ctx.viewport.time.span() as f64 * KEY_PAN_FRACTION).round() as i64;
                let delta = if key == Key::Left { -step } else { step };
                let panned = ctx.viewport.panned(delta, ctx.bounds);
                if panned == ctx.viewport {
                    Response::default()
                } else {
                    Response::viewport(panned)
                }
            }

            _ => Response::default(),
        }
    }

    /// Turn a pixel rectangle into a viewport, or `None` for an accidental click.
    fn commit_selection(&self, rect: Rect, ctx: &InteractionContext) -> Option<Viewport> {
        let zoom_time = rect.width >= self.zoom_min_pixels;
        let zoom_value = rect.height >= self.zoom_min_pixels;
        if !zoom_time && !zoom_value {
            tracing::debug!(width = rect.width, height = rect.height, "Discarded zoom selection");
            return None;
        }

        let mut viewport = ctx.viewport;
        if zoom_time {
            let start = ctx.scale.x_to_time(rect.x);
            let end = ctx.scale.x_to_time(rect.right()).max(start + 1);
            viewport.time = TimeRange::new(start, end).clamped_to(ctx.bounds)?;
        }
        if zoom_value {
            let min = ctx.scale.y_to_value(rect.bottom());
            let max = ctx.scale.y_to_value(rect.y);
            if min.is_finite() && max.is_finite() && min < max {
                viewport.value = ValueRange::Fixed { min, max };
            } else if zoom_time {
                tracing::debug!(min, max, "Discarded value zoom");
            } else {
                tracing::debug!(min, max, "Discarded zoom selection");
                return None;
            }
        }
        Some(viewport)
    }
}
