//! Iced canvas backend: replays draw commands and turns canvas events into
//! chart input.

use std::time::{Duration, Instant};

use iced::keyboard;
use iced::mouse;
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path, Stroke, Text, path};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme};

use crate::chart::{DrawCommand, Rgba, TextAlign};
use crate::instance::RenderedFrame;
use crate::interaction::{InputEvent, Key};
use crate::message::Message;
use crate::sync_bus::ChartId;

/// Height of a chart canvas.
pub const CHART_HEIGHT: f32 = 220.0;

const DOUBLE_CLICK: Duration = Duration::from_millis(350);
const DOUBLE_CLICK_SLOP: f32 = 4.0;

/// Widget-local state kept by iced between events.
#[derive(Debug, Default)]
pub struct CanvasState {
    inside: bool,
    pressed: bool,
    modifiers: keyboard::Modifiers,
    last_click: Option<(Instant, Point)>,
}

/// Canvas program for one chart.
struct ChartProgram<'a> {
    id: &'a ChartId,
    frame: Option<&'a RenderedFrame>,
    size: (f32, f32),
}

/// Create the canvas element of a chart.
///
/// `size` is the size the frame was rendered for. Input is published with the
/// current layout size; a size change without input is reported with
/// [`Message::Resized`].
pub fn chart_canvas<'a>(
    id: &'a ChartId,
    frame: Option<&'a RenderedFrame>,
    size: (f32, f32),
) -> Element<'a, Message> {
    Canvas::new(ChartProgram { id, frame, size })
        .width(Length::Fill)
        .height(Length::Fixed(CHART_HEIGHT))
        .into()
}

impl<'a> canvas::Program<Message> for ChartProgram<'a> {
    type State = CanvasState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let input = match event {
            canvas::Event::Mouse(mouse_event) => {
                self.handle_mouse(state, mouse_event, bounds, cursor)
            }
            canvas::Event::Keyboard(keyboard_event) => {
                self.handle_keyboard(state, keyboard_event, bounds, cursor)
            }
            _ => None,
        };

        let size = (bounds.width, bounds.height);
        match input {
            Some(input) => Some(
                canvas::Action::publish(Message::Input(self.id.clone(), input, size))
                    .and_capture(),
            ),
            None if size != self.size && bounds.width > 0.0 => Some(canvas::Action::publish(
                Message::Resized(self.id.clone(), bounds.width, bounds.height),
            )),
            None => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        if let Some(rendered) = self.frame {
            replay(&mut frame, rendered.commands());
        }
        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.pressed && state.modifiers.shift() {
            mouse::Interaction::ZoomIn
        } else if state.pressed {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

impl<'a> ChartProgram<'a> {
    fn handle_mouse(
        &self,
        state: &mut CanvasState,
        event: &mouse::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<InputEvent> {
        let position = cursor.position_in(bounds);

        match event {
            mouse::Event::CursorMoved { .. } => match position {
                Some(p) if !state.inside => {
                    state.inside = true;
                    Some(InputEvent::PointerEntered { x: p.x, y: p.y })
                }
                Some(p) => Some(InputEvent::PointerMoved { x: p.x, y: p.y }),
                None if state.pressed => {
                    // Keep dragging outside the widget; the controller clamps.
                    let global = cursor.position()?;
                    Some(InputEvent::PointerMoved {
                        x: global.x - bounds.x,
                        y: global.y - bounds.y,
                    })
                }
                None if state.inside => {
                    state.inside = false;
                    Some(InputEvent::PointerLeft)
                }
                None => None,
            },
            mouse::Event::CursorLeft => {
                if state.inside {
                    state.inside = false;
                    Some(InputEvent::PointerLeft)
                } else {
                    None
                }
            }
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                let p = position?;
                let now = Instant::now();
                let double = state.last_click.is_some_and(|(at, last)| {
                    now.duration_since(at) <= DOUBLE_CLICK
                        && (last.x - p.x).abs() <= DOUBLE_CLICK_SLOP
                        && (last.y - p.y).abs() <= DOUBLE_CLICK_SLOP
                });
                if double {
                    state.last_click = None;
                    state.pressed = false;
                    return Some(InputEvent::DoubleClick);
                }
                state.last_click = Some((now, p));
                state.pressed = true;
                Some(InputEvent::PointerPressed {
                    x: p.x,
                    y: p.y,
                    modifier: state.modifiers.shift(),
                })
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                if !state.pressed {
                    return None;
                }
                state.pressed = false;
                let global = cursor.position()?;
                Some(InputEvent::PointerReleased {
                    x: global.x - bounds.x,
                    y: global.y - bounds.y,
                })
            }
            mouse::Event::WheelScrolled { delta } => {
                let p = position?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / 50.0,
                };
                Some(InputEvent::Scrolled { x: p.x, lines })
            }
            _ => None,
        }
    }

    fn handle_keyboard(
        &self,
        state: &mut CanvasState,
        event: &keyboard::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<InputEvent> {
        use keyboard::key::Named;

        match event {
            keyboard::Event::ModifiersChanged(modifiers) => {
                state.modifiers = *modifiers;
                None
            }
            keyboard::Event::KeyPressed { key, .. } if cursor.is_over(bounds) => {
                let key = match key {
                    keyboard::Key::Named(Named::Escape) => Key::Escape,
                    keyboard::Key::Named(Named::ArrowLeft) => Key::Left,
                    keyboard::Key::Named(Named::ArrowRight) => Key::Right,
                    keyboard::Key::Character(c) if c.as_str() == "0" || c.as_str() == "r" => {
                        Key::Reset
                    }
                    _ => return None,
                };
                Some(InputEvent::Key(key))
            }
            _ => None,
        }
    }
}

/// Replay draw commands onto an iced frame.
pub fn replay<'c>(frame: &mut Frame, commands: impl IntoIterator<Item = &'c DrawCommand>) {
    let mut builder: Option<path::Builder> = None;

    for command in commands {
        match command {
            DrawCommand::BeginLayer(_) => {}
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                frame.fill_rectangle(
                    Point::new(*x, *y),
                    Size::new(*width, *height),
                    to_color(*color),
                );
            }
            DrawCommand::BeginPath => builder = Some(path::Builder::new()),
            DrawCommand::MoveTo { x, y } => {
                if let Some(b) = builder.as_mut() {
                    b.move_to(Point::new(*x, *y));
                }
            }
            DrawCommand::LineTo { x, y } => {
                if let Some(b) = builder.as_mut() {
                    b.line_to(Point::new(*x, *y));
                }
            }
            DrawCommand::ClosePath => {
                if let Some(b) = builder.as_mut() {
                    b.close();
                }
            }
            DrawCommand::Stroke { color, width } => {
                if let Some(b) = builder.take() {
                    frame.stroke(
                        &b.build(),
                        Stroke::default()
                            .with_color(to_color(*color))
                            .with_width(*width),
                    );
                }
            }
            DrawCommand::Fill { color } => {
                if let Some(b) = builder.take() {
                    let path: Path = b.build();
                    frame.fill(&path, to_color(*color));
                }
            }
            DrawCommand::Text {
                x,
                y,
                content,
                color,
                size,
                align,
            } => {
                let align_x = match align {
                    TextAlign::Left => iced::alignment::Horizontal::Left,
                    TextAlign::Center => iced::alignment::Horizontal::Center,
                    TextAlign::Right => iced::alignment::Horizontal::Right,
                };
                frame.fill_text(Text {
                    content: content.clone(),
                    position: Point::new(*x, *y),
                    color: to_color(*color),
                    size: (*size).into(),
                    align_x: align_x.into(),
                    ..Text::default()
                });
            }
        }
    }
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a as f32 / 255.0)
}
