//! Inline loading indicator, shown while data the view depends on is still
//! being fetched.

use leptos::{
    html::{p, span},
    prelude::*,
};

use crate::l10n::Localizer;

/// Renders a spinner followed by a localized "Loading…" label.
pub fn component(l10n: &Localizer) -> impl IntoView + use<> {
    p().class("loader")
        .attr("role", "status")
        .child((
            span().class("spinner animate-spin").attr("aria-hidden", "true"),
            span().class("text-sm italic").child(l10n.gettext("Loading…")),
        ))
}
