//! Backend-independent drawing primitives.

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => None,
        }
    }
}

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Logical group of commands; backends may cache or skip by layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Backgrounds of the widget and plot area.
    Frame,
    /// Gridlines.
    Grid,
    /// Axis labels.
    Axis,
    /// Everything belonging to one series.
    Series(String),
    /// Crosshair, selection, tooltip, status.
    Overlay,
}

/// Canvas-style drawing command.
///
/// Paths follow the usual canvas model: `BeginPath`, a sequence of `MoveTo` /
/// `LineTo` / `ClosePath`, then `Stroke` and/or `Fill`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    BeginLayer(Layer),
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    BeginPath,
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    ClosePath,
    Stroke {
        color: Rgba,
        width: f32,
    },
    Fill {
        color: Rgba,
    },
    Text {
        x: f32,
        y: f32,
        content: String,
        color: Rgba,
        size: f32,
        align: TextAlign,
    },
}

/// Ordered list of draw commands for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawCommandList {
    commands: Vec<DrawCommand>,
}

impl DrawCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn begin_layer(&mut self, layer: Layer) {
        self.push(DrawCommand::BeginLayer(layer));
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        self.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    /// Single stroked segment.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba, width: f32) {
        self.push(DrawCommand::BeginPath);
        self.push(DrawCommand::MoveTo {
            x: from.0,
            y: from.1,
        });
        self.push(DrawCommand::LineTo { x: to.0, y: to.1 });
        self.push(DrawCommand::Stroke { color, width });
    }

    pub fn text(
        &mut self,
        x: f32,
        y: f32,
        content: impl Into<String>,
        color: Rgba,
        size: f32,
        align: TextAlign,
    ) {
        self.push(DrawCommand::Text {
            x,
            y,
            content: content.into(),
            color,
            size,
            align,
        });
    }

    pub fn extend(&mut self, other: DrawCommandList) {
        self.commands.extend(other.commands);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Layers in the order they were opened.
    pub fn layers(&self) -> Vec<&Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::BeginLayer(layer) => Some(layer),
                _ => None,
            })
            .collect()
    }

    /// Commands of every occurrence of `layer`, excluding the markers.
    pub fn layer_commands(&self, layer: &Layer) -> Vec<&DrawCommand> {
        let mut current: Option<&Layer> = None;
        let mut out = Vec::new();
        for command in &self.commands {
            match command {
                DrawCommand::BeginLayer(l) => current = Some(l),
                other if current == Some(layer) => out.push(other),
                _ => {}
            }
        }
        out
    }

    /// Text contents in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a DrawCommandList {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
