use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::{EraseStyle, ImagePlacement};
use crate::error::BoardError;
use crate::geometry::{Corner, Rect};
use crate::stroke::{erase_pass, Ink, Stroke};
use crate::{ImageId, PageId, Point, SourceId};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrokeMode {
    Draw,
    Erase,
}

/// The toolbar values a stroke is authored with.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSettings {
    pub mode: StrokeMode,
    pub color: String,
    pub line_width: f32,
    pub eraser_size: f32,
    pub erase_style: EraseStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DraggableImage {
    pub id: ImageId,
    pub source: SourceId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub locked: bool,
}

impl DraggableImage {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Square of the lock glyph, inset from the top-right corner.
    pub fn lock_rect(&self, lock_size: f32, inset: f32) -> Rect {
        Rect::new(
            self.x + self.width - lock_size - inset,
            self.y + inset,
            lock_size,
            lock_size,
        )
    }

    pub fn move_to(&mut self, origin: Point) -> bool {
        if self.locked {
            return false;
        }
        self.x = origin.x;
        self.y = origin.y;
        true
    }

    /// Moves `corner` to `target` while the opposite corner stays put. Each
    /// axis is clamped to `min_size` independently.
    pub fn resize(&mut self, corner: Corner, target: Point, min_size: f32) -> bool {
        if self.locked {
            return false;
        }
        let anchor = self.rect().corner(corner.opposite());
        let (x, width) = if corner.is_left() {
            let width = (anchor.x - target.x).max(min_size);
            (anchor.x - width, width)
        } else {
            (anchor.x, (target.x - anchor.x).max(min_size))
        };
        let (y, height) = if corner.is_top() {
            let height = (anchor.y - target.y).max(min_size);
            (anchor.y - height, height)
        } else {
            (anchor.y, (target.y - anchor.y).max(min_size))
        };
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UndoEntry {
    Draw {
        stroke: Stroke,
    },
    Erase {
        strokes_before: Vec<Stroke>,
        erase_path: Vec<Point>,
    },
}

/// A stroke gesture that has begun but not been committed.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingStroke {
    Draw {
        path: Vec<Point>,
    },
    Marker {
        path: Vec<Point>,
    },
    Erase {
        strokes_before: Vec<Stroke>,
        path: Vec<Point>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageTicket {
    pub page: PageId,
    pub image: ImageId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thumbnail {
    pub id: ImageId,
    pub source: SourceId,
}

#[derive(Clone, Debug)]
pub struct Page {
    id: PageId,
    strokes: Vec<Stroke>,
    pending: Option<PendingStroke>,
    images: Vec<DraggableImage>,
    undo_stack: Vec<UndoEntry>,
    next_image_id: u32,
    requested: BTreeSet<ImageId>,
}

impl Page {
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            strokes: Vec::new(),
            pending: None,
            images: Vec::new(),
            undo_stack: Vec::new(),
            next_image_id: 1,
            requested: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn images(&self) -> &[DraggableImage] {
        &self.images
    }

    pub fn undo_stack(&self) -> &[UndoEntry] {
        &self.undo_stack
    }

    pub fn pending(&self) -> Option<&PendingStroke> {
        self.pending.as_ref()
    }

    /// Points of the in-progress draw stroke, empty when none.
    pub fn current_stroke(&self) -> &[Point] {
        match &self.pending {
            Some(PendingStroke::Draw { path }) | Some(PendingStroke::Marker { path }) => path,
            _ => &[],
        }
    }

    pub fn begin_stroke(&mut self, point: Point, tools: &ToolSettings) {
        if matches!(self.pending, Some(PendingStroke::Erase { .. })) {
            self.commit_stroke(tools);
        }
        self.pending = Some(match (tools.mode, tools.erase_style) {
            (StrokeMode::Draw, _) => PendingStroke::Draw { path: vec![point] },
            (StrokeMode::Erase, EraseStyle::Marker) => PendingStroke::Marker { path: vec![point] },
            (StrokeMode::Erase, EraseStyle::Split) => {
                let strokes_before = self.strokes.clone();
                erase_pass(&mut self.strokes, point, tools.eraser_size);
                PendingStroke::Erase {
                    strokes_before,
                    path: vec![point],
                }
            }
        });
    }

    pub fn extend_stroke(&mut self, point: Point, tools: &ToolSettings) {
        match &mut self.pending {
            Some(PendingStroke::Draw { path }) | Some(PendingStroke::Marker { path }) => {
                path.push(point);
            }
            Some(PendingStroke::Erase { path, .. }) => {
                path.push(point);
                erase_pass(&mut self.strokes, point, tools.eraser_size);
            }
            None => {}
        }
    }

    pub fn commit_stroke(&mut self, tools: &ToolSettings) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending {
            PendingStroke::Draw { path } => {
                self.push_stroke(Stroke {
                    path,
                    ink: Ink::Color(tools.color.clone()),
                    width: tools.line_width,
                });
            }
            PendingStroke::Marker { path } => {
                self.push_stroke(Stroke {
                    path,
                    ink: Ink::EraseMarker,
                    width: tools.eraser_size,
                });
            }
            PendingStroke::Erase {
                strokes_before,
                path,
            } => {
                if !path.is_empty() {
                    self.undo_stack.push(UndoEntry::Erase {
                        strokes_before,
                        erase_path: path,
                    });
                }
            }
        }
    }

    fn push_stroke(&mut self, stroke: Stroke) {
        if stroke.path.is_empty() {
            return;
        }
        if stroke.is_degenerate() {
            log::debug!("dropping single-point stroke on page {}", self.id);
            return;
        }
        self.strokes.push(stroke.clone());
        self.undo_stack.push(UndoEntry::Draw { stroke });
    }

    /// Reverses the latest entry. Does nothing while an erase gesture holds
    /// the stroke list.
    pub fn undo(&mut self) -> bool {
        if matches!(self.pending, Some(PendingStroke::Erase { .. })) {
            return false;
        }
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        match entry {
            UndoEntry::Draw { .. } => {
                self.strokes.pop();
            }
            UndoEntry::Erase { strokes_before, .. } => {
                self.strokes = strokes_before;
            }
        }
        true
    }

    /// Drops strokes and history. Images stay.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.pending = None;
        self.undo_stack.clear();
        let highest = self
            .images
            .iter()
            .map(|image| image.id)
            .chain(self.requested.iter().copied())
            .map(|id| id.0)
            .max()
            .unwrap_or(0);
        self.next_image_id = highest + 1;
    }

    pub fn image(&self, id: ImageId) -> Option<&DraggableImage> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn image_mut(&mut self, id: ImageId) -> Option<&mut DraggableImage> {
        self.images.iter_mut().find(|image| image.id == id)
    }

    /// Topmost image whose bounds contain `point`, locked or not.
    pub fn image_at(&self, point: Point) -> Option<ImageId> {
        self.images
            .iter()
            .rev()
            .find(|image| image.rect().contains(point))
            .map(|image| image.id)
    }

    pub fn thumbnails(&self) -> Vec<Thumbnail> {
        self.images
            .iter()
            .map(|image| Thumbnail {
                id: image.id,
                source: image.source,
            })
            .collect()
    }

    fn allocate_image_id(&mut self) -> ImageId {
        let id = ImageId(self.next_image_id);
        self.next_image_id += 1;
        id
    }

    pub fn request_image(&mut self) -> ImageId {
        let id = self.allocate_image_id();
        self.requested.insert(id);
        id
    }

    pub fn deliver_image(
        &mut self,
        id: ImageId,
        source: SourceId,
        placement: &ImagePlacement,
    ) -> Result<(), BoardError> {
        if !self.requested.remove(&id) {
            return Err(BoardError::UnknownImageRequest {
                page: self.id,
                image: id,
            });
        }
        self.push_image(id, source, placement);
        Ok(())
    }

    pub fn abandon_image(&mut self, id: ImageId) -> bool {
        self.requested.remove(&id)
    }

    pub fn remove_image(&mut self, id: ImageId) -> Option<DraggableImage> {
        let index = self.images.iter().position(|image| image.id == id)?;
        Some(self.images.remove(index))
    }

    /// Places another instance of an existing image's source.
    pub fn place_copy(&mut self, id: ImageId, placement: &ImagePlacement) -> Option<ImageId> {
        let source = self.image(id)?.source;
        let copy = self.allocate_image_id();
        self.push_image(copy, source, placement);
        Some(copy)
    }

    fn push_image(&mut self, id: ImageId, source: SourceId, placement: &ImagePlacement) {
        self.images.push(DraggableImage {
            id,
            source,
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
            locked: false,
        });
    }
}
