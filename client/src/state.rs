use std::collections::HashMap;

use web_sys::{
    CanvasRenderingContext2d, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSpanElement,
};

use pageboard_shared::{Controller, Document, TimerToken};

use crate::images::ImageStore;

pub struct Toolbar {
    pub color_input: HtmlInputElement,
    pub color_display: HtmlElement,
    pub eraser_button: HtmlButtonElement,
    pub eraser_size: HtmlInputElement,
    pub line_width: HtmlInputElement,
    pub clear_button: HtmlButtonElement,
    pub image_input: HtmlInputElement,
    pub image_list: HtmlElement,
}

pub struct PageBar {
    pub prev_button: HtmlButtonElement,
    pub next_button: HtmlButtonElement,
    pub new_button: HtmlButtonElement,
    pub delete_button: HtmlButtonElement,
    pub current: HtmlSpanElement,
    pub total: HtmlSpanElement,
}

pub struct State {
    pub html: web_sys::Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub board_width: f64,
    pub board_height: f64,
    pub document: Document,
    pub controller: Controller,
    pub images: ImageStore,
    /// Browser timeout handles of armed hover timers.
    pub timers: HashMap<TimerToken, i32>,
    pub toolbar: Toolbar,
    pub pages: PageBar,
}
