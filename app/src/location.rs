//! Access to the browser's address bar.
//!
//! Only the handful of operations the session report needs are exposed, behind
//! a trait so the URL clean-up can be exercised without a browser.

use shared_utils::has_tracking_params;

#[cfg_attr(test, mockall::automock)]
pub trait AddressBar {
    /// The current query string, including the leading `?` when present.
    fn search(&self) -> String;
    fn pathname(&self) -> String;
    /// Replaces the visible URL with `path` without reloading the page.
    fn replace_path(&self, path: &str);
}

/// [`AddressBar`] backed by `window.location` and `window.history`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserAddressBar;

impl AddressBar for BrowserAddressBar {
    fn search(&self) -> String {
        #[cfg(feature = "hydrate")]
        {
            web_sys::window()
                .and_then(|window| window.location().search().ok())
                .unwrap_or_default()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            String::new()
        }
    }

    fn pathname(&self) -> String {
        #[cfg(feature = "hydrate")]
        {
            web_sys::window()
                .and_then(|window| window.location().pathname().ok())
                .unwrap_or_else(|| "/".to_owned())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            "/".to_owned()
        }
    }

    fn replace_path(&self, path: &str) {
        #[cfg(feature = "hydrate")]
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let Ok(history) = window.history() else {
                leptos::logging::warn!("history API unavailable; leaving URL as-is");
                return;
            };
            let state = wasm_bindgen::JsValue::from_str(path);
            if let Err(err) = history.replace_state_with_url(&state, "", Some(path)) {
                leptos::logging::warn!("replaceState failed: {err:?}");
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = path;
        }
    }
}

/// Drops campaign tracking parameters from the visible URL.
///
/// The path is kept and the page is not reloaded. Returns `true` if the URL
/// was rewritten.
pub fn strip_tracking_params(bar: &dyn AddressBar) -> bool {
    if !has_tracking_params(&bar.search()) {
        return false;
    }
    bar.replace_path(&bar.pathname());
    true
}
