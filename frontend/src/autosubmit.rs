//! Self-submitting `<select>` menus, such as the footer's language picker.

use wasm_bindgen::{JsCast as _, closure::Closure};
use web_sys::{Document, Event, HtmlSelectElement};

/// Makes every select matching `selector` submit its form when changed.
///
/// Returns how many selects got a listener. The listeners live as long as
/// the page.
pub fn attach(document: &Document, selector: &str) -> u32 {
    let selects = match document.query_selector_all(selector) {
        Ok(selects) => selects,
        Err(err) => {
            log::warn!("invalid autosubmit selector {selector:?}: {err:?}");
            return 0;
        }
    };

    let mut attached = 0;
    for index in 0..selects.length() {
        let Some(select) = selects
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlSelectElement>().ok())
        else {
            continue;
        };

        let target = select.clone();
        let on_change = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let Some(form) = target.form() else {
                log::warn!("autosubmit select has no form");
                return;
            };
            if let Err(err) = form.submit() {
                log::warn!("autosubmit failed: {err:?}");
            }
        });
        if select
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .is_ok()
        {
            attached += 1;
        }
        on_change.forget();
    }
    attached
}
