//! This module defines the `document` component, which renders a wiki
//! document inside the single page app.
//!
//! The page data carries the document the server rendered for the initial URL.
//! That document is shown while the visitor stays on the initial path; other
//! documents are loaded by a full page navigation.

use chrono::{DateTime, Utc};
use leptos::html::{a, article, aside, div, h1, h2, li, nav, ol, p, ul};
use leptos::prelude::*;
use leptos_meta::{Title, TitleProps};
use leptos_router::hooks::use_location;

use crate::l10n::Localizer;
use crate::types::DocumentData;

/// Renders the initial document while the current path matches `initial_path`.
pub fn component(
    initial_path: String,
    initial_data: Option<DocumentData>,
    l10n: Localizer,
) -> impl IntoView {
    let location = use_location();

    move || {
        let current = location.pathname.get();
        match initial_data.clone().filter(|_| current == initial_path) {
            Some(document) => document_view(document, &l10n).into_any(),
            None => unavailable(&current, &l10n).into_any(),
        }
    }
}

/// Formats an RFC 3339 timestamp as e.g. `Mar 18, 2019`.
fn format_date(timestamp: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(timestamp).ok()?;
    Some(
        parsed
            .with_timezone(&Utc)
            .date_naive()
            .format("%b %-d, %Y")
            .to_string(),
    )
}

fn document_view(document: DocumentData, l10n: &Localizer) -> impl IntoView + use<> {
    let last_modified = document.last_modified.as_deref().and_then(format_date).map(|date| {
        Localizer::interpolate(&l10n.gettext("Last modified: %(date)s"), &[("date", &date)])
    });

    (
        Title(TitleProps::builder().text(format!("{} | MDN", document.title)).build()),
        nav().class("breadcrumbs").child(
            ol().child(
                document
                    .parents
                    .into_iter()
                    .map(|parent| li().child(a().href(parent.url).child(parent.title)))
                    .collect_view(),
            ),
        ),
        article().class("document").lang(document.locale).child((
            h1().child(document.title),
            aside().class("toc").child((
                h2().child(l10n.gettext("On this page")),
                ul().inner_html(document.toc_html),
            )),
            div().class("document-body prose").inner_html(document.body_html),
            last_modified.map(|text| p().class("last-modified").child(text)),
        )),
    )
}

fn unavailable(path: &str, l10n: &Localizer) -> impl IntoView + use<> {
    div().class("document-unavailable").child((
        p().child(l10n.gettext("This page is not loaded yet.")),
        a().href(path.to_owned())
            .rel("external")
            .child(l10n.gettext("Reload")),
    ))
}
