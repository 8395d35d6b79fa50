use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, File, FileReader, HtmlImageElement, ProgressEvent};

use pageboard_shared::SourceId;

struct Decoded {
    element: HtmlImageElement,
    url: String,
}

/// Decoded image sources, shared by every image placed from them.
#[derive(Default)]
pub struct ImageStore {
    next_id: u32,
    sources: HashMap<SourceId, Decoded>,
}

impl ImageStore {
    pub fn insert(&mut self, element: HtmlImageElement, url: String) -> SourceId {
        self.next_id += 1;
        let id = SourceId(self.next_id);
        self.sources.insert(id, Decoded { element, url });
        id
    }

    pub fn remove(&mut self, id: SourceId) {
        self.sources.remove(&id);
    }

    pub fn element(&self, id: SourceId) -> Option<&HtmlImageElement> {
        self.sources.get(&id).map(|decoded| &decoded.element)
    }

    pub fn url(&self, id: SourceId) -> Option<&str> {
        self.sources.get(&id).map(|decoded| decoded.url.as_str())
    }
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

fn is_pasted_image(kind: &str, mime: &str) -> bool {
    kind == "file" && is_image_mime(mime)
}

/// First file-kind item of the clipboard whose type is an image.
pub fn pasted_image(event: &ClipboardEvent) -> Option<File> {
    let items = event.clipboard_data()?.items();
    (0..items.length())
        .filter_map(|index| items.get(index))
        .find(|item| is_pasted_image(&item.kind(), &item.type_()))
        .and_then(|item| item.get_as_file().ok().flatten())
}

type DecodeCallback = Box<dyn FnOnce(Option<(HtmlImageElement, String)>)>;
type DecodeSlot = Rc<RefCell<Option<DecodeCallback>>>;

fn finish(slot: &DecodeSlot, result: Option<(HtmlImageElement, String)>) {
    let callback = slot.borrow_mut().take();
    if let Some(callback) = callback {
        callback(result);
    }
}

/// Reads `file` as a data URL and decodes it into an image element.
/// `on_done` runs exactly once, with `None` if reading or decoding fails.
pub fn decode_file(
    file: &File,
    on_done: impl FnOnce(Option<(HtmlImageElement, String)>) + 'static,
) -> Result<(), JsValue> {
    let callback: DecodeSlot = Rc::new(RefCell::new(Some(Box::new(on_done))));
    let reader = FileReader::new()?;

    let onerror_slot = callback.clone();
    let onerror = Closure::once_into_js(move |_: ProgressEvent| {
        finish(&onerror_slot, None);
    });
    reader.set_onerror(Some(onerror.unchecked_ref()));

    let onload_slot = callback;
    let onload = Closure::once_into_js(move |event: ProgressEvent| {
        let url = event
            .target()
            .and_then(|target| target.dyn_into::<FileReader>().ok())
            .and_then(|reader| reader.result().ok())
            .and_then(|result| result.as_string());
        let (Some(url), Ok(element)) = (url, HtmlImageElement::new()) else {
            finish(&onload_slot, None);
            return;
        };

        let failed_slot = onload_slot.clone();
        let onimageerror = Closure::once_into_js(move |_: web_sys::Event| {
            finish(&failed_slot, None);
        });
        element.set_onerror(Some(onimageerror.unchecked_ref()));

        let loaded_element = element.clone();
        let loaded_url = url.clone();
        let onimageload = Closure::once_into_js(move |_: web_sys::Event| {
            finish(&onload_slot, Some((loaded_element, loaded_url)));
        });
        element.set_onload(Some(onimageload.unchecked_ref()));
        element.set_src(&url);
    });
    reader.set_onload(Some(onload.unchecked_ref()));

    reader.read_as_data_url(file)
}
