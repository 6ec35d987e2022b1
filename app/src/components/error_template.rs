//! Error page shown when the single page app cannot route a URL.
//!
//! The page names the error and its HTTP status and links back to the
//! locale's homepage.

use http::status::StatusCode;
use leptos::{
    html::{a, div, h1, p},
    prelude::*,
};
use thiserror::Error;

use crate::l10n::Localizer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Page not found")]
    NotFound,
}

impl AppError {
    /// Returns the HTTP status code associated with the error.
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Renders the error page for `error`.
pub fn component(error: AppError, l10n: &Localizer) -> impl IntoView + use<> {
    let status = error.status_code();
    let home = format!("/{}/", l10n.locale());

    div().class("grid place-content-center px-4 h-full antialiased error-page").child((
        h1().class("mb-6 text-center").child(l10n.gettext(&error.to_string())),
        p().class("text-xl tracking-widest uppercase").child(status.as_u16().to_string()),
        div().class("mt-6 text-center").child(
            a().href(home)
                .rel("external")
                .child(l10n.gettext("Go back home")),
        ),
    ))
}
