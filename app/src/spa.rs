//! This module defines the single page app, the UI tree for document pages.
//!
//! Client-side routing is handled by the router; the session and localizer
//! are passed down explicitly to every view that needs them.

use leptos::prelude::*;
use leptos_router::{
    ParamSegment, StaticSegment, WildcardSegment,
    components::{FlatRoutes, Route, Router},
};

use crate::components::{error_template, header};
use crate::document;
use crate::l10n::Localizer;
use crate::session::UserSession;
use crate::types::DocumentData;

/// Renders the single page app, starting on `initial_url`.
pub fn component(
    initial_url: String,
    initial_data: Option<DocumentData>,
    session: UserSession,
    l10n: Localizer,
) -> impl IntoView {
    let initial_path = shared_utils::path_of(&initial_url).to_owned();
    let fallback_l10n = l10n.clone();
    let document_l10n = l10n.clone();
    let document_view = move || {
        document::component(
            initial_path.clone(),
            initial_data.clone(),
            document_l10n.clone(),
        )
    };

    view! {
        <Router>
            {header::component(session, l10n.clone())}
            <main class="container mx-auto max-w-5xl">
                <FlatRoutes fallback=move || {
                    error_template::component(error_template::AppError::NotFound, &fallback_l10n)
                }>
                    <Route
                        path=(ParamSegment("locale"), StaticSegment("docs"), WildcardSegment("slug"))
                        view=document_view
                    />
                </FlatRoutes>
            </main>
            {crate::footer_component(&l10n)}
        </Router>
    }
}
