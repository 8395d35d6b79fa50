use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlImageElement};

use pageboard_shared::{ImageId, Thumbnail};

use crate::images::ImageStore;

pub enum SidebarAction {
    Place(ImageId),
    Remove(ImageId),
}

/// Rebuilds the thumbnail list for the active page.
pub fn render_image_list(
    document: &Document,
    list_el: &HtmlElement,
    thumbnails: &[Thumbnail],
    images: &ImageStore,
) {
    list_el.set_inner_html("");
    for thumbnail in thumbnails {
        let Some(url) = images.url(thumbnail.source) else {
            continue;
        };
        let Ok(container) = document.create_element("div") else {
            continue;
        };
        let _ = container.set_attribute("class", "image-container");
        let _ = container.set_attribute("data-image-id", &thumbnail.id.to_string());
        if let Ok(element) = document.create_element("img") {
            if let Ok(img) = element.dyn_into::<HtmlImageElement>() {
                img.set_src(url);
                img.set_alt(&format!("Image {}", thumbnail.id));
                img.set_draggable(false);
                let _ = container.append_child(&img);
            }
        }
        if let Ok(element) = document.create_element("button") {
            if let Ok(remove_button) = element.dyn_into::<HtmlButtonElement>() {
                let _ = remove_button.set_attribute("type", "button");
                let _ = remove_button.set_attribute("data-action", "remove");
                let _ = remove_button.set_attribute("aria-label", "Remove image");
                let _ = remove_button.set_attribute("class", "remove-btn");
                remove_button.set_text_content(Some("\u{d7}"));
                let _ = container.append_child(&remove_button);
            }
        }
        let _ = list_el.append_child(&container);
    }
}

pub fn sidebar_action_from_event(event: &Event) -> Option<SidebarAction> {
    let mut remove = false;
    let mut current = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    while let Some(element) = current {
        if element.get_attribute("data-action").as_deref() == Some("remove") {
            remove = true;
        }
        if let Some(id) = element.get_attribute("data-image-id") {
            let id = ImageId(id.parse::<u32>().ok()?);
            return Some(if remove {
                SidebarAction::Remove(id)
            } else {
                SidebarAction::Place(id)
            });
        }
        current = element.parent_element();
    }
    None
}
