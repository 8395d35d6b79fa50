//! Turns pointer, keyboard and toolbar input into document mutations.
//!
//! Every entry point returns the [`Effects`] the caller has to carry out:
//! redraws, sidebar and navigation refreshes, and the hover timer that
//! reveals an image's lock glyph.

use crate::config::BoardConfig;
use crate::document::Document;
use crate::error::BoardError;
use crate::geometry::{corner_at, Corner};
use crate::page::{ImageTicket, StrokeMode, ToolSettings};
use crate::render::{render, Frame, Overlay};
use crate::{ImageId, PageId, Point, SourceId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Redraw,
    RefreshImages,
    RefreshNavigation,
    ScheduleHover { token: TimerToken, delay_ms: u32 },
    CancelHover { token: TimerToken },
    /// No image on any page draws from this source anymore.
    ReleaseSource(SourceId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects(Vec<Effect>);

impl Effects {
    pub fn push(&mut self, effect: Effect) {
        if !self.0.contains(&effect) {
            self.0.push(effect);
        }
    }

    pub fn contains(&self, effect: &Effect) -> bool {
        self.0.contains(effect)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Effect> {
        self.0.iter()
    }
}

impl IntoIterator for Effects {
    type Item = Effect;
    type IntoIter = std::vec::IntoIter<Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub code: String,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn is_undo(&self) -> bool {
        self.ctrl && (self.key == "z" || (self.alt && self.code == "KeyZ"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Stroke,
    Drag {
        image: ImageId,
        offset: Point,
    },
    Resize {
        image: ImageId,
        corner: Corner,
        grab: Point,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Hover {
    image: Option<ImageId>,
    revealed: bool,
    timer: Option<TimerToken>,
}

pub struct Controller {
    config: BoardConfig,
    tools: ToolSettings,
    gesture: Gesture,
    hover: Hover,
    pointer: Option<Point>,
    next_timer: u64,
}

impl Controller {
    pub fn new(config: BoardConfig) -> Self {
        let tools = ToolSettings {
            mode: StrokeMode::Draw,
            color: config.default_color.clone(),
            line_width: config.default_line_width,
            eraser_size: config.default_eraser_size,
            erase_style: config.erase_style,
        };
        Self {
            config,
            tools,
            gesture: Gesture::Idle,
            hover: Hover::default(),
            pointer: None,
            next_timer: 1,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    pub fn hovered_image(&self) -> Option<ImageId> {
        self.hover.image
    }

    pub fn lock_revealed(&self) -> bool {
        self.hover.revealed
    }

    pub fn overlay(&self) -> Overlay<'_> {
        Overlay {
            tools: &self.tools,
            revealed_lock: if self.hover.revealed {
                self.hover.image
            } else {
                None
            },
            lock_size: self.config.lock_size,
            lock_inset: self.config.lock_inset,
            eraser_cursor: match self.tools.mode {
                StrokeMode::Erase => self.pointer,
                StrokeMode::Draw => None,
            },
        }
    }

    pub fn frame(&self, document: &Document) -> Frame {
        render(document.active_page(), &self.overlay())
    }

    /// CSS cursor for the canvas.
    pub fn cursor(&self) -> &'static str {
        match self.gesture {
            Gesture::Drag { .. } => "pointer",
            Gesture::Resize { corner, .. } => match corner {
                Corner::TopLeft | Corner::BottomRight => "nwse-resize",
                Corner::TopRight | Corner::BottomLeft => "nesw-resize",
            },
            Gesture::Idle | Gesture::Stroke => match self.tools.mode {
                StrokeMode::Draw => "crosshair",
                StrokeMode::Erase => "none",
            },
        }
    }

    pub fn pointer_down(&mut self, document: &mut Document, point: Point) -> Effects {
        let mut effects = Effects::default();
        if !point.is_finite() {
            return effects;
        }
        self.pointer = Some(point);
        if self.gesture != Gesture::Idle {
            self.end_gesture(document, &mut effects);
        }
        let page = document.active_page_mut();

        if self.hover.revealed {
            if let Some(image) = self.hover.image.and_then(|id| page.image_mut(id)) {
                let lock = image.lock_rect(self.config.lock_size, self.config.lock_inset);
                if lock.contains(point) {
                    image.locked = !image.locked;
                    log::debug!("image {} locked={}", image.id, image.locked);
                    effects.push(Effect::Redraw);
                    return effects;
                }
            }
        }

        let handle_size = self.config.handle_size;
        let grabbed = page
            .images()
            .iter()
            .rev()
            .filter(|image| !image.locked)
            .find_map(|image| {
                let rect = image.rect();
                if let Some(corner) = corner_at(&rect, point, handle_size) {
                    return Some(Gesture::Resize {
                        image: image.id,
                        corner,
                        grab: point.offset_from(rect.corner(corner)),
                    });
                }
                if rect.contains(point) {
                    return Some(Gesture::Drag {
                        image: image.id,
                        offset: point.offset_from(Point::new(image.x, image.y)),
                    });
                }
                None
            });
        if let Some(gesture) = grabbed {
            self.gesture = gesture;
            return effects;
        }

        page.begin_stroke(point, &self.tools);
        self.gesture = Gesture::Stroke;
        effects.push(Effect::Redraw);
        effects
    }

    pub fn pointer_move(&mut self, document: &mut Document, point: Point) -> Effects {
        let mut effects = Effects::default();
        if !point.is_finite() {
            return effects;
        }
        self.pointer = Some(point);
        self.update_hover(document, point, &mut effects);

        let page = document.active_page_mut();
        match self.gesture {
            Gesture::Idle => {
                if self.tools.mode == StrokeMode::Erase {
                    effects.push(Effect::Redraw);
                }
            }
            Gesture::Stroke => {
                page.extend_stroke(point, &self.tools);
                effects.push(Effect::Redraw);
            }
            Gesture::Drag { image, offset } => {
                let origin = point.offset_from(offset);
                if page.image_mut(image).is_some_and(|image| image.move_to(origin)) {
                    effects.push(Effect::Redraw);
                }
            }
            Gesture::Resize {
                image,
                corner,
                grab,
            } => {
                let target = point.offset_from(grab);
                let min_size = self.config.min_image_size;
                if page
                    .image_mut(image)
                    .is_some_and(|image| image.resize(corner, target, min_size))
                {
                    effects.push(Effect::Redraw);
                }
            }
        }
        effects
    }

    pub fn pointer_up(&mut self, document: &mut Document) -> Effects {
        let mut effects = Effects::default();
        self.end_gesture(document, &mut effects);
        effects
    }

    pub fn pointer_leave(&mut self, document: &mut Document) -> Effects {
        let mut effects = Effects::default();
        self.reset_hover(&mut effects);
        self.pointer = None;
        self.end_gesture(document, &mut effects);
        effects.push(Effect::Redraw);
        effects
    }

    /// Reveals the lock glyph if `token` is still the armed hover timer.
    pub fn hover_timer_fired(&mut self, token: TimerToken) -> Effects {
        let mut effects = Effects::default();
        if self.hover.timer != Some(token) {
            return effects;
        }
        self.hover.timer = None;
        if self.hover.image.is_some() {
            self.hover.revealed = true;
            effects.push(Effect::Redraw);
        }
        effects
    }

    pub fn key_down(&mut self, document: &mut Document, key: &KeyPress) -> Effects {
        let mut effects = Effects::default();
        if key.is_undo() && document.active_page_mut().undo() {
            effects.push(Effect::Redraw);
        }
        effects
    }

    pub fn set_color(&mut self, color: &str) {
        let color = color.trim();
        if !color.is_empty() {
            self.tools.color = color.to_string();
        }
    }

    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() {
            self.tools.line_width = width.max(1.0);
        }
    }

    pub fn set_eraser_size(&mut self, size: f32) -> Effects {
        let mut effects = Effects::default();
        if size.is_finite() {
            self.tools.eraser_size = size.max(1.0);
            if self.tools.mode == StrokeMode::Erase {
                effects.push(Effect::Redraw);
            }
        }
        effects
    }

    pub fn toggle_eraser(&mut self) -> Effects {
        self.tools.mode = match self.tools.mode {
            StrokeMode::Draw => StrokeMode::Erase,
            StrokeMode::Erase => StrokeMode::Draw,
        };
        let mut effects = Effects::default();
        effects.push(Effect::Redraw);
        effects
    }

    /// Wipes strokes and undo history of the active page. Not undoable.
    pub fn clear(&mut self, document: &mut Document) -> Effects {
        if self.gesture == Gesture::Stroke {
            self.gesture = Gesture::Idle;
        }
        document.active_page_mut().clear();
        let mut effects = Effects::default();
        effects.push(Effect::Redraw);
        effects
    }

    pub fn switch_to(&mut self, document: &mut Document, page: PageId) -> Effects {
        let before = document.active_page().id();
        if !document.switch_to(page) {
            return Effects::default();
        }
        self.page_changed(before != page)
    }

    pub fn previous_page(&mut self, document: &mut Document) -> Effects {
        if !document.previous_page() {
            return Effects::default();
        }
        self.page_changed(true)
    }

    pub fn next_page(&mut self, document: &mut Document) -> Effects {
        if !document.next_page() {
            return Effects::default();
        }
        self.page_changed(true)
    }

    pub fn new_page(&mut self, document: &mut Document) -> Effects {
        let id = document.create_page();
        log::info!("created page {id}");
        self.page_changed(true)
    }

    pub fn delete_page(&mut self, document: &mut Document) -> Effects {
        let sources: Vec<SourceId> = document
            .active_page()
            .images()
            .iter()
            .map(|image| image.source)
            .collect();
        match document.delete_page() {
            Some(id) => {
                log::info!("deleted page {id}");
                let mut effects = self.page_changed(true);
                for source in sources {
                    release_if_unused(document, source, &mut effects);
                }
                effects
            }
            None => Effects::default(),
        }
    }

    pub fn request_image(&mut self, document: &mut Document) -> ImageTicket {
        document.request_image()
    }

    pub fn image_decoded(
        &mut self,
        document: &mut Document,
        ticket: ImageTicket,
        source: SourceId,
    ) -> Result<Effects, BoardError> {
        if let Err(error) = document.deliver_image(ticket, source, &self.config.image_placement) {
            log::warn!("dropping decoded image {}: {error}", ticket.image);
            return Err(error);
        }
        let mut effects = Effects::default();
        if document.active_page().id() == ticket.page {
            effects.push(Effect::Redraw);
            effects.push(Effect::RefreshImages);
        }
        Ok(effects)
    }

    pub fn image_failed(&mut self, document: &mut Document, ticket: ImageTicket) {
        log::warn!("image {} for page {} failed to decode", ticket.image, ticket.page);
        document.abandon_image(ticket);
    }

    pub fn remove_image(&mut self, document: &mut Document, id: ImageId) -> Effects {
        let mut effects = Effects::default();
        let Some(removed) = document.active_page_mut().remove_image(id) else {
            return effects;
        };
        if self.hover.image == Some(id) {
            self.reset_hover(&mut effects);
        }
        if matches!(
            self.gesture,
            Gesture::Drag { image, .. } | Gesture::Resize { image, .. } if image == id
        ) {
            self.gesture = Gesture::Idle;
        }
        effects.push(Effect::Redraw);
        effects.push(Effect::RefreshImages);
        release_if_unused(document, removed.source, &mut effects);
        effects
    }

    pub fn place_copy(&mut self, document: &mut Document, id: ImageId) -> Effects {
        let mut effects = Effects::default();
        let placement = self.config.image_placement;
        if document.active_page_mut().place_copy(id, &placement).is_some() {
            effects.push(Effect::Redraw);
            effects.push(Effect::RefreshImages);
        }
        effects
    }

    fn end_gesture(&mut self, document: &mut Document, effects: &mut Effects) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Stroke => {
                document.active_page_mut().commit_stroke(&self.tools);
                effects.push(Effect::Redraw);
            }
            Gesture::Drag { .. } | Gesture::Resize { .. } | Gesture::Idle => {}
        }
    }

    fn update_hover(&mut self, document: &Document, point: Point, effects: &mut Effects) {
        let under = document.active_page().image_at(point);
        if under == self.hover.image {
            return;
        }
        self.reset_hover(effects);
        self.hover.image = under;
        if under.is_some() {
            let token = TimerToken(self.next_timer);
            self.next_timer += 1;
            self.hover.timer = Some(token);
            effects.push(Effect::ScheduleHover {
                token,
                delay_ms: self.config.hover_delay_ms,
            });
        }
        effects.push(Effect::Redraw);
    }

    fn reset_hover(&mut self, effects: &mut Effects) {
        if let Some(token) = self.hover.timer.take() {
            effects.push(Effect::CancelHover { token });
        }
        self.hover.image = None;
        self.hover.revealed = false;
    }

    /// The page being left keeps any pending stroke; drag, resize and hover
    /// belong to its images and are dropped.
    fn page_changed(&mut self, changed: bool) -> Effects {
        let mut effects = Effects::default();
        if changed {
            self.gesture = Gesture::Idle;
            self.reset_hover(&mut effects);
        }
        effects.push(Effect::Redraw);
        effects.push(Effect::RefreshImages);
        effects.push(Effect::RefreshNavigation);
        effects
    }
}

fn release_if_unused(document: &Document, source: SourceId, effects: &mut Effects) {
    if !document.source_in_use(source) {
        log::debug!("releasing image source {source}");
        effects.push(Effect::ReleaseSource(source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EraseStyle;
    use crate::stroke::Ink;

    fn setup() -> (Document, Controller) {
        (Document::new(), Controller::new(BoardConfig::default()))
    }

    /// Adds an image at the default placement (50, 50, 106x118).
    fn add_image(document: &mut Document, controller: &mut Controller, source: u32) -> ImageId {
        let ticket = controller.request_image(document);
        controller
            .image_decoded(document, ticket, SourceId(source))
            .unwrap();
        ticket.image
    }

    fn scheduled_token(effects: &Effects) -> TimerToken {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::ScheduleHover { token, .. } => Some(*token),
                _ => None,
            })
            .expect("hover timer scheduled")
    }

    #[test]
    fn draw_gesture_commits_on_pointer_up() {
        let (mut document, mut controller) = setup();
        controller.set_color("#00ff00");
        controller.set_line_width(4.0);
        controller.pointer_down(&mut document, Point::new(300.0, 300.0));
        controller.pointer_move(&mut document, Point::new(310.0, 305.0));
        let effects = controller.pointer_up(&mut document);
        assert!(effects.contains(&Effect::Redraw));
        let stroke = &document.active_page().strokes()[0];
        assert_eq!(
            stroke.path,
            vec![Point::new(300.0, 300.0), Point::new(310.0, 305.0)]
        );
        assert_eq!(stroke.ink, Ink::Color("#00ff00".to_string()));
        assert_eq!(stroke.width, 4.0);
    }

    #[test]
    fn pointer_leave_commits_stroke() {
        let (mut document, mut controller) = setup();
        controller.pointer_down(&mut document, Point::new(300.0, 300.0));
        controller.pointer_move(&mut document, Point::new(320.0, 300.0));
        controller.pointer_leave(&mut document);
        assert_eq!(document.active_page().strokes().len(), 1);
        controller.pointer_move(&mut document, Point::new(330.0, 300.0));
        assert_eq!(document.active_page().strokes()[0].path.len(), 2);
    }

    #[test]
    fn dragging_moves_image_by_offset() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        controller.pointer_down(&mut document, Point::new(70.0, 80.0));
        assert_eq!(controller.cursor(), "pointer");
        controller.pointer_move(&mut document, Point::new(-100.0, 10.0));
        controller.pointer_up(&mut document);
        let image = document.active_page().image(id).unwrap();
        assert_eq!((image.x, image.y), (-120.0, -20.0));
        assert!(document.active_page().strokes().is_empty());
        assert!(document.active_page().undo_stack().is_empty());
    }

    #[test]
    fn corner_grab_starts_resize() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        controller.pointer_down(&mut document, Point::new(158.0, 170.0));
        assert_eq!(controller.cursor(), "nwse-resize");
        controller.pointer_move(&mut document, Point::new(208.0, 190.0));
        controller.pointer_up(&mut document);
        let image = document.active_page().image(id).unwrap();
        assert_eq!((image.x, image.y, image.width, image.height), (50.0, 50.0, 156.0, 138.0));
    }

    #[test]
    fn resize_without_motion_keeps_size() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        let grab = Point::new(53.0, 46.0);
        controller.pointer_down(&mut document, grab);
        controller.pointer_move(&mut document, grab);
        controller.pointer_up(&mut document);
        let image = document.active_page().image(id).unwrap();
        assert_eq!((image.x, image.y, image.width, image.height), (50.0, 50.0, 106.0, 118.0));
    }

    #[test]
    fn resize_never_goes_below_floor() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        controller.pointer_down(&mut document, Point::new(50.0, 168.0));
        for point in [
            Point::new(1000.0, -1000.0),
            Point::new(155.0, 51.0),
            Point::new(-3.0, 400.0),
        ] {
            controller.pointer_move(&mut document, point);
            let image = document.active_page().image(id).unwrap();
            assert!(image.width >= 20.0 && image.height >= 20.0);
            assert_eq!(image.x + image.width, 156.0);
            assert_eq!(image.y, 50.0);
        }
    }

    #[test]
    fn topmost_unlocked_image_is_grabbed() {
        let (mut document, mut controller) = setup();
        let below = add_image(&mut document, &mut controller, 1);
        let above = add_image(&mut document, &mut controller, 2);
        document
            .active_page_mut()
            .image_mut(above)
            .unwrap()
            .move_to(Point::new(100.0, 100.0));
        controller.pointer_down(&mut document, Point::new(120.0, 120.0));
        controller.pointer_move(&mut document, Point::new(121.0, 121.0));
        controller.pointer_up(&mut document);
        assert_eq!(document.active_page().image(above).unwrap().x, 101.0);
        assert_eq!(document.active_page().image(below).unwrap().x, 50.0);

        document.active_page_mut().image_mut(above).unwrap().locked = true;
        controller.pointer_down(&mut document, Point::new(121.0, 121.0));
        controller.pointer_move(&mut document, Point::new(122.0, 122.0));
        controller.pointer_up(&mut document);
        assert_eq!(document.active_page().image(above).unwrap().x, 101.0);
        assert_eq!(document.active_page().image(below).unwrap().x, 51.0);
    }

    #[test]
    fn locked_image_lets_drawing_through() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        document.active_page_mut().image_mut(id).unwrap().locked = true;
        controller.pointer_down(&mut document, Point::new(60.0, 60.0));
        controller.pointer_move(&mut document, Point::new(90.0, 90.0));
        controller.pointer_up(&mut document);
        assert_eq!(document.active_page().strokes().len(), 1);
        let image = document.active_page().image(id).unwrap();
        assert_eq!((image.x, image.y), (50.0, 50.0));
    }

    #[test]
    fn hover_reveals_lock_only_after_its_timer() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        let effects = controller.pointer_move(&mut document, Point::new(100.0, 100.0));
        let token = scheduled_token(&effects);
        assert!(effects.contains(&Effect::ScheduleHover {
            token,
            delay_ms: 1500
        }));
        assert_eq!(controller.hovered_image(), Some(id));
        assert!(!controller.lock_revealed());
        assert_eq!(controller.overlay().revealed_lock, None);

        let effects = controller.hover_timer_fired(token);
        assert_eq!(effects.iter().collect::<Vec<_>>(), vec![&Effect::Redraw]);
        assert_eq!(controller.overlay().revealed_lock, Some(id));
    }

    #[test]
    fn leaving_hover_cancels_timer() {
        let (mut document, mut controller) = setup();
        add_image(&mut document, &mut controller, 1);
        let token = scheduled_token(&controller.pointer_move(&mut document, Point::new(100.0, 100.0)));
        let effects = controller.pointer_move(&mut document, Point::new(400.0, 400.0));
        assert!(effects.contains(&Effect::CancelHover { token }));
        assert!(controller.hover_timer_fired(token).is_empty());
        assert!(!controller.lock_revealed());

        let token = scheduled_token(&controller.pointer_move(&mut document, Point::new(100.0, 100.0)));
        let effects = controller.pointer_leave(&mut document);
        assert!(effects.contains(&Effect::CancelHover { token }));
        assert_eq!(controller.hovered_image(), None);
        assert!(controller.hover_timer_fired(token).is_empty());
    }

    #[test]
    fn moving_within_same_image_keeps_timer() {
        let (mut document, mut controller) = setup();
        add_image(&mut document, &mut controller, 1);
        let token = scheduled_token(&controller.pointer_move(&mut document, Point::new(100.0, 100.0)));
        let effects = controller.pointer_move(&mut document, Point::new(110.0, 100.0));
        assert!(effects.is_empty());
        assert!(!controller.hover_timer_fired(token).is_empty());
    }

    #[test]
    fn stale_token_is_ignored() {
        let (mut document, mut controller) = setup();
        add_image(&mut document, &mut controller, 1);
        let first = scheduled_token(&controller.pointer_move(&mut document, Point::new(100.0, 100.0)));
        controller.pointer_move(&mut document, Point::new(400.0, 400.0));
        let second = scheduled_token(&controller.pointer_move(&mut document, Point::new(100.0, 100.0)));
        assert_ne!(first, second);
        assert!(controller.hover_timer_fired(first).is_empty());
        assert!(!controller.lock_revealed());
        controller.hover_timer_fired(second);
        assert!(controller.lock_revealed());
    }

    #[test]
    fn lock_glyph_toggles_without_gesture() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        let token = scheduled_token(&controller.pointer_move(&mut document, Point::new(140.0, 60.0)));
        controller.hover_timer_fired(token);

        controller.pointer_down(&mut document, Point::new(140.0, 60.0));
        controller.pointer_move(&mut document, Point::new(145.0, 65.0));
        controller.pointer_up(&mut document);
        let image = document.active_page().image(id).unwrap();
        assert!(image.locked);
        assert_eq!((image.x, image.y), (50.0, 50.0));
        assert!(document.active_page().strokes().is_empty());

        controller.pointer_down(&mut document, Point::new(140.0, 60.0));
        controller.pointer_up(&mut document);
        assert!(!document.active_page().image(id).unwrap().locked);
    }

    #[test]
    fn hidden_lock_glyph_area_drags_instead() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        controller.pointer_move(&mut document, Point::new(140.0, 60.0));
        controller.pointer_down(&mut document, Point::new(140.0, 60.0));
        controller.pointer_up(&mut document);
        assert!(!document.active_page().image(id).unwrap().locked);
    }

    #[test]
    fn ctrl_z_undoes_last_stroke() {
        let (mut document, mut controller) = setup();
        controller.pointer_down(&mut document, Point::new(300.0, 300.0));
        controller.pointer_move(&mut document, Point::new(320.0, 300.0));
        controller.pointer_up(&mut document);

        let plain = KeyPress {
            key: "z".to_string(),
            code: "KeyZ".to_string(),
            ctrl: false,
            alt: false,
        };
        assert!(controller.key_down(&mut document, &plain).is_empty());
        assert_eq!(document.active_page().strokes().len(), 1);

        let ctrl_alt = KeyPress {
            key: "\u{3a9}".to_string(),
            code: "KeyZ".to_string(),
            ctrl: true,
            alt: true,
        };
        assert!(ctrl_alt.is_undo());
        let effects = controller.key_down(&mut document, &ctrl_alt);
        assert!(effects.contains(&Effect::Redraw));
        assert!(document.active_page().strokes().is_empty());
        assert!(controller.key_down(&mut document, &ctrl_alt).is_empty());
    }

    #[test]
    fn eraser_gesture_splits_and_undoes() {
        let (mut document, mut controller) = setup();
        controller.pointer_down(&mut document, Point::new(300.0, 300.0));
        for x in 301..=400 {
            controller.pointer_move(&mut document, Point::new(x as f32, 300.0));
        }
        controller.pointer_up(&mut document);
        let before = document.active_page().strokes().to_vec();

        controller.toggle_eraser();
        assert_eq!(controller.cursor(), "none");
        controller.pointer_down(&mut document, Point::new(350.0, 300.0));
        controller.pointer_move(&mut document, Point::new(351.0, 300.0));
        controller.pointer_up(&mut document);
        assert_eq!(document.active_page().strokes().len(), 2);
        assert_eq!(
            controller.overlay().eraser_cursor,
            Some(Point::new(351.0, 300.0))
        );

        let undo = KeyPress {
            key: "z".to_string(),
            code: "KeyZ".to_string(),
            ctrl: true,
            alt: false,
        };
        controller.key_down(&mut document, &undo);
        assert_eq!(document.active_page().strokes(), before.as_slice());
    }

    #[test]
    fn marker_style_records_erase_stroke() {
        let config = BoardConfig {
            erase_style: EraseStyle::Marker,
            ..BoardConfig::default()
        };
        let mut document = Document::new();
        let mut controller = Controller::new(config);
        controller.toggle_eraser();
        controller.pointer_down(&mut document, Point::new(300.0, 300.0));
        controller.pointer_move(&mut document, Point::new(310.0, 300.0));
        controller.pointer_up(&mut document);
        let stroke = &document.active_page().strokes()[0];
        assert_eq!(stroke.ink, Ink::EraseMarker);
        assert_eq!(stroke.width, 10.0);
    }

    #[test]
    fn page_change_drops_hover_and_gesture() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        let token = scheduled_token(&controller.pointer_move(&mut document, Point::new(100.0, 100.0)));
        controller.pointer_down(&mut document, Point::new(100.0, 100.0));

        let effects = controller.new_page(&mut document);
        assert!(effects.contains(&Effect::CancelHover { token }));
        assert!(effects.contains(&Effect::RefreshImages));
        assert!(effects.contains(&Effect::RefreshNavigation));
        assert_eq!(controller.hovered_image(), None);

        controller.pointer_move(&mut document, Point::new(400.0, 400.0));
        controller.pointer_up(&mut document);
        controller.previous_page(&mut document);
        let image = document.active_page().image(id).unwrap();
        assert_eq!((image.x, image.y), (50.0, 50.0));
    }

    #[test]
    fn pending_stroke_is_carried_across_pages() {
        let (mut document, mut controller) = setup();
        let points = [Point::new(300.0, 300.0), Point::new(305.0, 301.0)];
        controller.pointer_down(&mut document, points[0]);
        controller.pointer_move(&mut document, points[1]);
        controller.new_page(&mut document);
        controller.pointer_up(&mut document);
        assert!(document.active_page().strokes().is_empty());
        controller.switch_to(&mut document, PageId(1));
        assert_eq!(document.active_page().current_stroke(), &points);
        assert!(document.active_page().strokes().is_empty());
    }

    #[test]
    fn unknown_page_commands_have_no_effect() {
        let (mut document, mut controller) = setup();
        assert!(controller.switch_to(&mut document, PageId(9)).is_empty());
        assert!(controller.delete_page(&mut document).is_empty());
        assert!(controller.next_page(&mut document).is_empty());
        assert!(controller.previous_page(&mut document).is_empty());
    }

    #[test]
    fn late_decode_for_background_page_skips_redraw() {
        let (mut document, mut controller) = setup();
        let ticket = controller.request_image(&mut document);
        controller.new_page(&mut document);
        let effects = controller
            .image_decoded(&mut document, ticket, SourceId(3))
            .unwrap();
        assert!(effects.is_empty());
        assert_eq!(document.page(PageId(1)).unwrap().images().len(), 1);
    }

    #[test]
    fn decode_for_deleted_page_is_an_error() {
        let (mut document, mut controller) = setup();
        controller.new_page(&mut document);
        let ticket = controller.request_image(&mut document);
        controller.delete_page(&mut document);
        assert_eq!(
            controller.image_decoded(&mut document, ticket, SourceId(3)),
            Err(BoardError::PageNotFound(PageId(2)))
        );
    }

    #[test]
    fn removing_hovered_image_cancels_hover() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 1);
        let token = scheduled_token(&controller.pointer_move(&mut document, Point::new(100.0, 100.0)));
        let effects = controller.remove_image(&mut document, id);
        assert!(effects.contains(&Effect::CancelHover { token }));
        assert!(effects.contains(&Effect::RefreshImages));
        assert!(document.active_page().images().is_empty());
        assert!(controller.remove_image(&mut document, id).is_empty());
    }

    #[test]
    fn deleting_page_releases_its_sources() {
        let (mut document, mut controller) = setup();
        controller.new_page(&mut document);
        add_image(&mut document, &mut controller, 1);
        add_image(&mut document, &mut controller, 2);
        let effects = controller.delete_page(&mut document);
        assert!(effects.contains(&Effect::ReleaseSource(SourceId(1))));
        assert!(effects.contains(&Effect::ReleaseSource(SourceId(2))));
        assert!(effects.contains(&Effect::RefreshNavigation));
    }

    #[test]
    fn source_on_another_page_is_kept() {
        let (mut document, mut controller) = setup();
        add_image(&mut document, &mut controller, 1);
        controller.new_page(&mut document);
        add_image(&mut document, &mut controller, 1);
        let effects = controller.delete_page(&mut document);
        assert!(!effects.contains(&Effect::ReleaseSource(SourceId(1))));
        assert!(document.source_in_use(SourceId(1)));
    }

    #[test]
    fn removing_last_copy_releases_source() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 3);
        controller.place_copy(&mut document, id);
        let copy = document.active_page().thumbnails()[1].id;
        let effects = controller.remove_image(&mut document, id);
        assert!(!effects.contains(&Effect::ReleaseSource(SourceId(3))));
        let effects = controller.remove_image(&mut document, copy);
        assert!(effects.contains(&Effect::ReleaseSource(SourceId(3))));
    }

    #[test]
    fn resize_holds_minimum_size_under_low_configured_floor() {
        let config = BoardConfig::from_json(r#"{"min_image_size": 2}"#).unwrap();
        let mut document = Document::new();
        let mut controller = Controller::new(config);
        let id = add_image(&mut document, &mut controller, 1);
        controller.pointer_down(&mut document, Point::new(156.0, 168.0));
        controller.pointer_move(&mut document, Point::new(-500.0, -500.0));
        controller.pointer_up(&mut document);
        let image = document
            .active_page()
            .images()
            .iter()
            .find(|image| image.id == id)
            .unwrap();
        assert!(image.width >= 20.0 && image.height >= 20.0);
    }

    #[test]
    fn copies_get_fresh_ids() {
        let (mut document, mut controller) = setup();
        let id = add_image(&mut document, &mut controller, 5);
        controller.place_copy(&mut document, id);
        let thumbnails = document.active_page().thumbnails();
        assert_eq!(thumbnails.len(), 2);
        assert_ne!(thumbnails[0].id, thumbnails[1].id);
        assert_eq!(thumbnails[1].source, SourceId(5));
    }

    #[test]
    fn clear_keeps_images() {
        let (mut document, mut controller) = setup();
        add_image(&mut document, &mut controller, 1);
        controller.pointer_down(&mut document, Point::new(300.0, 300.0));
        controller.pointer_move(&mut document, Point::new(310.0, 300.0));
        controller.pointer_up(&mut document);
        controller.clear(&mut document);
        assert!(document.active_page().strokes().is_empty());
        assert_eq!(document.active_page().images().len(), 1);
    }

    #[test]
    fn tool_values_are_clamped() {
        let (_, mut controller) = setup();
        controller.set_line_width(0.0);
        controller.set_eraser_size(f32::NAN);
        controller.set_color("   ");
        assert_eq!(controller.tools().line_width, 1.0);
        assert_eq!(controller.tools().eraser_size, 10.0);
        assert_eq!(controller.tools().color, "#FFFFFF");
    }
}
