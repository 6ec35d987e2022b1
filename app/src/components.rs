//! Reusable UI pieces shared by the page views.
//!
//! Each sub-module exposes a `component` function building one element of
//! the page chrome: the header with the user menu, footer icons, the loading
//! indicator and the error page.

pub mod error_template;
pub mod header;
pub mod icons;
pub mod loader;
