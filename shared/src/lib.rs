use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod page;
pub mod render;
pub mod stroke;

pub use config::{BoardConfig, EraseStyle, ImagePlacement};
pub use document::{Document, PageNav};
pub use error::BoardError;
pub use geometry::{Corner, Rect};
pub use interaction::{Controller, Effect, Effects, KeyPress, TimerToken};
pub use page::{
    DraggableImage, ImageTicket, Page, PendingStroke, StrokeMode, Thumbnail, ToolSettings,
    UndoEntry,
};
pub use render::{render, Composite, DrawCommand, Frame, Overlay};
pub use stroke::{erase_pass, Ink, Stroke};

/// Canvas-local position in CSS pixels.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(PageId);
id_type!(ImageId);
// Handle into the client's store of decoded pixel sources.
id_type!(SourceId);
