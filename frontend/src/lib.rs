//! This crate provides the WebAssembly (WASM) entry point for the MDN front end.
//!
//! The page that loads it calls [`bootstrap`] with the page data the server
//! rendered. The entry point finds the mount point, hydrates or renders the UI
//! tree the server asked for, and wires the non-Leptos parts of the page.

mod autosubmit;

use app::{BootstrapError, ClientConfig, MountMode, plan_mount};
use wasm_bindgen::{JsCast as _, prelude::*};

/// Log level for the browser console.
const fn log_level() -> log::Level {
    if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    }
}

#[wasm_bindgen]
/// Mounts the front end.
///
/// `data` is the JSON page data (`url`, `documentData`, `locale`,
/// `stringCatalog`, `pluralFunction`). It is consumed by this call; nothing
/// keeps a reference to it afterwards.
///
/// Pages without a mount point are left alone. An unknown component name or
/// malformed page data is thrown back to the caller as an `Error`.
pub fn bootstrap(data: String) -> Result<(), JsError> {
    _ = console_log::init_with_level(log_level());
    console_error_panic_hook::set_once();

    let config = ClientConfig::default();
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(BootstrapError::MissingWindow)?;

    let Some(container) = document.get_element_by_id(&config.container_id) else {
        log::debug!("no #{} on this page; nothing to mount", config.container_id);
        return Ok(());
    };
    let component_name = container.get_attribute(&config.component_attribute);
    let has_rendered_children = container.first_element_child().is_some();

    let plan = match plan_mount(component_name.as_deref(), has_rendered_children, &data) {
        Ok(plan) => plan,
        Err(err) => {
            log::error!("{err}");
            return Err(err.into());
        }
    };
    drop(data);

    let container = container
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| JsError::new("mount point is not an HTML element"))?;
    let mode = plan.mode;
    let view_config = config.clone();
    log::debug!("mounting {:?} with {mode:?}", plan.view);

    match mode {
        MountMode::Hydrate => {
            leptos::mount::hydrate_from(container, move || plan.into_view(&view_config)).forget();
        }
        MountMode::Render => {
            leptos::mount::mount_to(container, move || plan.into_view(&view_config)).forget();
        }
    }

    let attached = autosubmit::attach(&document, &config.autosubmit_selector);
    log::debug!("autosubmit attached to {attached} select(s)");
    Ok(())
}
