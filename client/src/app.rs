use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, ClipboardEvent, Event, File, HtmlCanvasElement, KeyboardEvent,
    PointerEvent,
};

use pageboard_shared::{Controller, Document, Effect, Effects, KeyPress, StrokeMode, TimerToken};

use crate::dom::{
    event_to_point, get_element, input_number, read_config, resize_canvas, set_canvas_cursor,
    set_color_display, set_tool_button, update_navigation,
};
use crate::images::{decode_file, is_image_mime, pasted_image, ImageStore};
use crate::render::redraw;
use crate::sidebar::{render_image_list, sidebar_action_from_event, SidebarAction};
use crate::state::{PageBar, State, Toolbar};

type Shared = Rc<RefCell<State>>;

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let html = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&html, "drawing-board")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let toolbar = Toolbar {
        color_input: get_element(&html, "stroke")?,
        color_display: get_element(&html, "colorDisplay")?,
        eraser_button: get_element(&html, "eraser")?,
        eraser_size: get_element(&html, "eraserSize")?,
        line_width: get_element(&html, "lineWidth")?,
        clear_button: get_element(&html, "clear")?,
        image_input: get_element(&html, "imageInput")?,
        image_list: get_element(&html, "imageList")?,
    };
    let pages = PageBar {
        prev_button: get_element(&html, "prev-page")?,
        next_button: get_element(&html, "next-page")?,
        new_button: get_element(&html, "new-page")?,
        delete_button: get_element(&html, "delete-page")?,
        current: get_element(&html, "current-page")?,
        total: get_element(&html, "total-pages")?,
    };

    let config = read_config(&html);
    let controller = Controller::new(config);
    {
        let tools = controller.tools();
        toolbar.color_input.set_value(&tools.color);
        set_color_display(&toolbar.color_display, &tools.color);
        toolbar.line_width.set_value(&tools.line_width.to_string());
        toolbar.eraser_size.set_value(&tools.eraser_size.to_string());
        set_tool_button(&toolbar.eraser_button, false);
    }

    let document = Document::new();
    update_navigation(&pages, document.navigation());

    let state: Shared = Rc::new(RefCell::new(State {
        html: html.clone(),
        canvas: canvas.clone(),
        ctx,
        board_width: 0.0,
        board_height: 0.0,
        document,
        controller,
        images: ImageStore::default(),
        timers: HashMap::new(),
        toolbar,
        pages,
    }));

    {
        let mut state = state.borrow_mut();
        resize_canvas(&window, &mut state);
        set_canvas_cursor(&state.canvas, state.controller.cursor());
    }

    {
        let resize_state = state.clone();
        let window_cb = window.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            let mut state = resize_state.borrow_mut();
            resize_canvas(&window_cb, &mut state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let down_state = state.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let Some(point) = event_to_point(&down_canvas, &event) else {
                return;
            };
            with_board(&down_state, |controller, document| {
                controller.pointer_down(document, point)
            });
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let Some(point) = event_to_point(&move_canvas, &event) else {
                return;
            };
            with_board(&move_state, |controller, document| {
                controller.pointer_move(document, point)
            });
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let up_state = state.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |_: PointerEvent| {
            with_board(&up_state, |controller, document| {
                controller.pointer_up(document)
            });
        });
        canvas.add_event_listener_with_callback("pointerup", onup.as_ref().unchecked_ref())?;
        onup.forget();
    }

    {
        let leave_state = state.clone();
        let onleave = Closure::<dyn FnMut(PointerEvent)>::new(move |_: PointerEvent| {
            with_board(&leave_state, |controller, document| {
                controller.pointer_leave(document)
            });
        });
        canvas
            .add_event_listener_with_callback("pointerleave", onleave.as_ref().unchecked_ref())?;
        onleave.forget();
    }

    {
        let key_state = state.clone();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let key = KeyPress {
                key: event.key(),
                code: event.code(),
                ctrl: event.ctrl_key(),
                alt: event.alt_key(),
            };
            if !key.is_undo() {
                return;
            }
            event.prevent_default();
            with_board(&key_state, |controller, document| {
                controller.key_down(document, &key)
            });
        });
        html.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    {
        let color_input = state.borrow().toolbar.color_input.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            color_input.click();
        });
        state
            .borrow()
            .toolbar
            .color_display
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let color_state = state.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = color_state.borrow_mut();
            let value = state.toolbar.color_input.value();
            state.controller.set_color(&value);
            set_color_display(&state.toolbar.color_display, &state.controller.tools().color);
        });
        state
            .borrow()
            .toolbar
            .color_input
            .add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let width_state = state.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = width_state.borrow_mut();
            if let Some(width) = input_number(&state.toolbar.line_width) {
                state.controller.set_line_width(width);
            }
        });
        state
            .borrow()
            .toolbar
            .line_width
            .add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let size_state = state.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let effects = {
                let mut state = size_state.borrow_mut();
                match input_number(&state.toolbar.eraser_size) {
                    Some(size) => state.controller.set_eraser_size(size),
                    None => Effects::default(),
                }
            };
            apply(&size_state, effects);
        });
        state
            .borrow()
            .toolbar
            .eraser_size
            .add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let eraser_state = state.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let effects = {
                let mut state = eraser_state.borrow_mut();
                let effects = state.controller.toggle_eraser();
                let erasing = state.controller.tools().mode == StrokeMode::Erase;
                set_tool_button(&state.toolbar.eraser_button, erasing);
                effects
            };
            apply(&eraser_state, effects);
        });
        state
            .borrow()
            .toolbar
            .eraser_button
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let targets: [(web_sys::EventTarget, fn(&mut Controller, &mut Document) -> Effects); 5] = {
            let state = state.borrow();
            [
                (state.toolbar.clear_button.clone().into(), |controller, document| {
                    controller.clear(document)
                }),
                (state.pages.prev_button.clone().into(), |controller, document| {
                    controller.previous_page(document)
                }),
                (state.pages.next_button.clone().into(), |controller, document| {
                    controller.next_page(document)
                }),
                (state.pages.new_button.clone().into(), |controller, document| {
                    controller.new_page(document)
                }),
                (state.pages.delete_button.clone().into(), |controller, document| {
                    controller.delete_page(document)
                }),
            ]
        };
        for (target, operation) in targets {
            add_board_click(&state, &target, operation)?;
        }
    }

    {
        let upload_state = state.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let input = upload_state.borrow().toolbar.image_input.clone();
            let Some(files) = input.files() else {
                return;
            };
            let files = (0..files.length())
                .filter_map(|index| files.get(index))
                .collect::<Vec<_>>();
            for file in files {
                load_image_file(&upload_state, file);
            }
            input.set_value("");
        });
        state
            .borrow()
            .toolbar
            .image_input
            .add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let paste_state = state.clone();
        let onpaste = Closure::<dyn FnMut(ClipboardEvent)>::new(move |event: ClipboardEvent| {
            if let Some(file) = pasted_image(&event) {
                event.prevent_default();
                load_image_file(&paste_state, file);
            }
        });
        html.add_event_listener_with_callback("paste", onpaste.as_ref().unchecked_ref())?;
        onpaste.forget();
    }

    {
        let list_state = state.clone();
        let onmousedown = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(action) = sidebar_action_from_event(&event) else {
                return;
            };
            event.prevent_default();
            with_board(&list_state, |controller, document| match action {
                SidebarAction::Place(id) => controller.place_copy(document, id),
                SidebarAction::Remove(id) => controller.remove_image(document, id),
            });
        });
        state
            .borrow()
            .toolbar
            .image_list
            .add_event_listener_with_callback("mousedown", onmousedown.as_ref().unchecked_ref())?;
        onmousedown.forget();
    }

    log::info!("board ready");
    Ok(())
}

/// Runs a controller operation against the board and carries out its effects.
fn with_board(shared: &Shared, operation: impl FnOnce(&mut Controller, &mut Document) -> Effects) {
    let effects = {
        let mut guard = shared.borrow_mut();
        let state = &mut *guard;
        operation(&mut state.controller, &mut state.document)
    };
    apply(shared, effects);
}

fn add_board_click(
    shared: &Shared,
    target: &web_sys::EventTarget,
    operation: fn(&mut Controller, &mut Document) -> Effects,
) -> Result<(), JsValue> {
    let click_state = shared.clone();
    let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
        with_board(&click_state, operation);
    });
    target.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
    onclick.forget();
    Ok(())
}

fn apply(shared: &Shared, effects: Effects) {
    let mut schedule = Vec::new();
    {
        let mut state = shared.borrow_mut();
        let mut needs_redraw = false;
        for effect in effects {
            match effect {
                Effect::Redraw => needs_redraw = true,
                Effect::RefreshImages => render_image_list(
                    &state.html,
                    &state.toolbar.image_list,
                    &state.document.active_page().thumbnails(),
                    &state.images,
                ),
                Effect::RefreshNavigation => {
                    update_navigation(&state.pages, state.document.navigation())
                }
                Effect::ScheduleHover { token, delay_ms } => schedule.push((token, delay_ms)),
                Effect::CancelHover { token } => {
                    if let (Some(handle), Some(window)) =
                        (state.timers.remove(&token), web_sys::window())
                    {
                        window.clear_timeout_with_handle(handle);
                    }
                }
                Effect::ReleaseSource(source) => state.images.remove(source),
            }
        }
        if needs_redraw {
            redraw(&state);
        }
        set_canvas_cursor(&state.canvas, state.controller.cursor());
    }
    for (token, delay_ms) in schedule {
        schedule_hover(shared, token, delay_ms);
    }
}

fn schedule_hover(shared: &Shared, token: TimerToken, delay_ms: u32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let timer_state = shared.clone();
    let callback = Closure::once_into_js(move || {
        let effects = {
            let mut state = timer_state.borrow_mut();
            state.timers.remove(&token);
            state.controller.hover_timer_fired(token)
        };
        apply(&timer_state, effects);
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        timeout_millis(delay_ms),
    ) {
        Ok(handle) => {
            shared.borrow_mut().timers.insert(token, handle);
        }
        Err(error) => log::warn!("could not arm hover timer: {error:?}"),
    }
}

fn timeout_millis(delay_ms: u32) -> i32 {
    i32::try_from(delay_ms).unwrap_or(i32::MAX)
}

fn load_image_file(shared: &Shared, file: File) {
    if !is_image_mime(&file.type_()) {
        log::info!("ignoring non-image file {}", file.name());
        return;
    }
    let ticket = {
        let mut guard = shared.borrow_mut();
        let state = &mut *guard;
        state.controller.request_image(&mut state.document)
    };
    let done_state = shared.clone();
    let started = decode_file(&file, move |decoded| {
        let effects = {
            let mut guard = done_state.borrow_mut();
            let state = &mut *guard;
            match decoded {
                Some((element, url)) => {
                    let source = state.images.insert(element, url);
                    match state
                        .controller
                        .image_decoded(&mut state.document, ticket, source)
                    {
                        Ok(effects) => effects,
                        Err(_) => {
                            state.images.remove(source);
                            Effects::default()
                        }
                    }
                }
                None => {
                    state.controller.image_failed(&mut state.document, ticket);
                    Effects::default()
                }
            }
        };
        apply(&done_state, effects);
    });
    if let Err(error) = started {
        log::error!("could not read {}: {error:?}", file.name());
        let mut guard = shared.borrow_mut();
        let state = &mut *guard;
        state.controller.image_failed(&mut state.document, ticket);
    }
}
