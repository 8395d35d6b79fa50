use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlInputElement, PointerEvent,
    Window,
};

use pageboard_shared::{BoardConfig, PageNav, Point};

use crate::render::redraw;
use crate::state::{PageBar, State};

const CONFIG_ELEMENT: &str = "board-config";

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

/// Reads the JSON block embedded in the page, if any.
pub fn read_config(document: &Document) -> BoardConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_ELEMENT)
        .and_then(|element| element.text_content())
    else {
        return BoardConfig::default();
    };
    match BoardConfig::from_json(&text) {
        Ok(config) => config,
        Err(error) => {
            log::warn!("ignoring malformed #{CONFIG_ELEMENT}: {error}");
            BoardConfig::default()
        }
    }
}

pub fn set_tool_button(button: &HtmlButtonElement, active: bool) {
    let pressed = if active { "true" } else { "false" };
    let _ = button.set_attribute("aria-pressed", pressed);
    let _ = button.class_list().toggle_with_force("active", active);
}

pub fn set_canvas_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
    if let Ok(element) = canvas.clone().dyn_into::<HtmlElement>() {
        let _ = element.style().set_property("cursor", cursor);
    }
}

pub fn set_color_display(display: &HtmlElement, color: &str) {
    let _ = display.style().set_property("background-color", color);
}

/// Integer value of a numeric input, `None` while it is empty or invalid.
pub fn input_number(input: &HtmlInputElement) -> Option<f32> {
    input.value().trim().parse::<i32>().ok().map(|value| value as f32)
}

pub fn update_navigation(bar: &PageBar, nav: PageNav) {
    bar.current.set_text_content(Some(&nav.current.to_string()));
    bar.total.set_text_content(Some(&nav.total.to_string()));
    bar.prev_button.set_disabled(!nav.can_prev);
    bar.next_button.set_disabled(!nav.can_next);
    bar.delete_button.set_disabled(!nav.can_delete);
}

pub fn resize_canvas(window: &Window, state: &mut State) {
    let rect = state.canvas.get_bounding_client_rect();
    let dpr = window.device_pixel_ratio();
    state.canvas.set_width((rect.width() * dpr) as u32);
    state.canvas.set_height((rect.height() * dpr) as u32);
    let _ = state.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    state.ctx.set_line_cap("round");
    state.ctx.set_line_join("round");
    state.board_width = rect.width();
    state.board_height = rect.height();
    log::debug!("canvas resized to {}x{}", state.board_width, state.board_height);
    redraw(state);
}

pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let point = Point::new(
        (event.client_x() as f64 - rect.left()) as f32,
        (event.client_y() as f64 - rect.top()) as f32,
    );
    point.is_finite().then_some(point)
}
