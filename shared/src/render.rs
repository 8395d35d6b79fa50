use crate::geometry::Rect;
use crate::page::{Page, PendingStroke, ToolSettings};
use crate::stroke::Ink;
use crate::{ImageId, Point, SourceId};

const LOCKED_FILL: &str = "rgba(255, 0, 0, 0.7)";
const UNLOCKED_FILL: &str = "rgba(0, 255, 0, 0.7)";
const LOCKED_GLYPH: &str = "\u{1F512}";
const UNLOCKED_GLYPH: &str = "\u{1F513}";
const SUBTRACT_COLOR: &str = "#000000";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composite {
    /// Normal source-over painting.
    Paint,
    /// Removes what lies underneath (destination-out).
    Subtract,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    Image {
        source: SourceId,
        rect: Rect,
    },
    LockBadge {
        rect: Rect,
        fill: &'static str,
        glyph: &'static str,
    },
    Path {
        points: Vec<Point>,
        color: String,
        width: f32,
        composite: Composite,
    },
    EraserCursor {
        center: Point,
        radius: f32,
    },
}

/// Display list for one redraw, executed in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

/// Interaction state the frame depends on besides the page itself.
#[derive(Clone, Debug)]
pub struct Overlay<'a> {
    pub tools: &'a ToolSettings,
    pub revealed_lock: Option<ImageId>,
    pub lock_size: f32,
    pub lock_inset: f32,
    pub eraser_cursor: Option<Point>,
}

pub fn render(page: &Page, overlay: &Overlay<'_>) -> Frame {
    let mut commands = vec![DrawCommand::Clear];

    for image in page.images() {
        commands.push(DrawCommand::Image {
            source: image.source,
            rect: image.rect(),
        });
        if overlay.revealed_lock == Some(image.id) {
            let (fill, glyph) = if image.locked {
                (LOCKED_FILL, LOCKED_GLYPH)
            } else {
                (UNLOCKED_FILL, UNLOCKED_GLYPH)
            };
            commands.push(DrawCommand::LockBadge {
                rect: image.lock_rect(overlay.lock_size, overlay.lock_inset),
                fill,
                glyph,
            });
        }
    }

    for stroke in page.strokes() {
        let (color, composite) = match &stroke.ink {
            Ink::Color(color) => (color.clone(), Composite::Paint),
            Ink::EraseMarker => (SUBTRACT_COLOR.to_string(), Composite::Subtract),
        };
        commands.push(DrawCommand::Path {
            points: stroke.path.clone(),
            color,
            width: stroke.width,
            composite,
        });
    }

    match page.pending() {
        Some(PendingStroke::Draw { path }) => commands.push(DrawCommand::Path {
            points: path.clone(),
            color: overlay.tools.color.clone(),
            width: overlay.tools.line_width,
            composite: Composite::Paint,
        }),
        Some(PendingStroke::Marker { path }) => commands.push(DrawCommand::Path {
            points: path.clone(),
            color: SUBTRACT_COLOR.to_string(),
            width: overlay.tools.eraser_size,
            composite: Composite::Subtract,
        }),
        Some(PendingStroke::Erase { .. }) | None => {}
    }

    if let Some(center) = overlay.eraser_cursor {
        commands.push(DrawCommand::EraserCursor {
            center,
            radius: overlay.tools.eraser_size / 2.0,
        });
    }

    Frame { commands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EraseStyle, ImagePlacement};
    use crate::page::StrokeMode;
    use crate::PageId;

    fn tools(mode: StrokeMode) -> ToolSettings {
        ToolSettings {
            mode,
            color: "#abcdef".to_string(),
            line_width: 3.0,
            eraser_size: 12.0,
            erase_style: EraseStyle::Marker,
        }
    }

    fn overlay(tools: &ToolSettings) -> Overlay<'_> {
        Overlay {
            tools,
            revealed_lock: None,
            lock_size: 16.0,
            lock_inset: 5.0,
            eraser_cursor: None,
        }
    }

    fn sample_page() -> Page {
        let placement = ImagePlacement::default();
        let mut page = Page::new(PageId(1));
        let a = page.request_image();
        let b = page.request_image();
        page.deliver_image(a, SourceId(10), &placement).unwrap();
        page.deliver_image(b, SourceId(11), &placement).unwrap();
        let draw = tools(StrokeMode::Draw);
        page.begin_stroke(Point::new(0.0, 0.0), &draw);
        page.extend_stroke(Point::new(10.0, 10.0), &draw);
        page.commit_stroke(&draw);
        let erase = tools(StrokeMode::Erase);
        page.begin_stroke(Point::new(5.0, 5.0), &erase);
        page.extend_stroke(Point::new(6.0, 6.0), &erase);
        page.commit_stroke(&erase);
        page
    }

    #[test]
    fn empty_page_only_clears() {
        let page = Page::new(PageId(1));
        let tools = tools(StrokeMode::Draw);
        assert_eq!(render(&page, &overlay(&tools)).commands, vec![DrawCommand::Clear]);
    }

    #[test]
    fn images_then_strokes_in_order() {
        let page = sample_page();
        let tools = tools(StrokeMode::Draw);
        let frame = render(&page, &overlay(&tools));
        assert_eq!(frame.commands.len(), 5);
        assert_eq!(frame.commands[0], DrawCommand::Clear);
        assert!(matches!(frame.commands[1], DrawCommand::Image { source: SourceId(10), .. }));
        assert!(matches!(frame.commands[2], DrawCommand::Image { source: SourceId(11), .. }));
        match &frame.commands[3] {
            DrawCommand::Path { color, width, composite, .. } => {
                assert_eq!(color, "#abcdef");
                assert_eq!(*width, 3.0);
                assert_eq!(*composite, Composite::Paint);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &frame.commands[4] {
            DrawCommand::Path { width, composite, .. } => {
                assert_eq!(*width, 12.0);
                assert_eq!(*composite, Composite::Subtract);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn render_is_deterministic() {
        let page = sample_page();
        let tools = tools(StrokeMode::Erase);
        let mut overlay = overlay(&tools);
        overlay.revealed_lock = Some(ImageId(2));
        overlay.eraser_cursor = Some(Point::new(3.0, 4.0));
        assert_eq!(render(&page, &overlay), render(&page, &overlay));
    }

    #[test]
    fn lock_badge_follows_its_image() {
        let page = sample_page();
        let tools = tools(StrokeMode::Draw);
        let mut overlay = overlay(&tools);
        overlay.revealed_lock = Some(ImageId(1));
        let frame = render(&page, &overlay);
        assert_eq!(
            frame.commands[2],
            DrawCommand::LockBadge {
                rect: Rect::new(135.0, 55.0, 16.0, 16.0),
                fill: UNLOCKED_FILL,
                glyph: UNLOCKED_GLYPH,
            }
        );
        assert!(matches!(frame.commands[3], DrawCommand::Image { source: SourceId(11), .. }));
    }

    #[test]
    fn pending_stroke_and_cursor_come_last() {
        let mut page = Page::new(PageId(1));
        let draw = tools(StrokeMode::Draw);
        page.begin_stroke(Point::new(1.0, 1.0), &draw);
        page.extend_stroke(Point::new(2.0, 2.0), &draw);
        let mut overlay = overlay(&draw);
        overlay.eraser_cursor = Some(Point::new(9.0, 9.0));
        let frame = render(&page, &overlay);
        assert_eq!(
            frame.commands[1],
            DrawCommand::Path {
                points: vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)],
                color: "#abcdef".to_string(),
                width: 3.0,
                composite: Composite::Paint,
            }
        );
        assert_eq!(
            frame.commands[2],
            DrawCommand::EraserCursor {
                center: Point::new(9.0, 9.0),
                radius: 6.0
            }
        );
    }
}
