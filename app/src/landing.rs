//! This module defines the `landing` component, the site's homepage.
//!
//! It shows the masthead with the site search and greets signed-in visitors
//! once their session has resolved.

use leptos::{
    html::{div, form, h1, input, main, p},
    prelude::*,
};
use leptos_meta::{Title, TitleProps};

use crate::components::header;
use crate::l10n::Localizer;
use crate::session::{UserData, UserSession};

/// Renders the homepage.
pub fn component(session: UserSession, l10n: Localizer) -> impl IntoView {
    let search_action = format!("/{}/search", l10n.locale());
    let greeting_l10n = l10n.clone();
    let greeting_session = session.clone();

    div().class("landing").child((
        Title(TitleProps::builder().text(l10n.gettext("MDN Web Docs")).build()),
        header::component(session, l10n.clone()),
        main().class("home-masthead").child((
            h1().child(l10n.gettext("Resources for developers, by developers.")),
            form().action(search_action).method("get").attr("role", "search").child(
                input()
                    .r#type("search")
                    .name("q")
                    .placeholder(l10n.gettext("Search MDN")),
            ),
            move || {
                greeting_session
                    .user()
                    .and_then(|user| greeting(&user, &greeting_l10n))
                    .map(|text| p().class("greeting").child(text))
            },
        )),
        crate::footer_component(&l10n),
    ))
}

/// Welcome line for a signed-in visitor; `None` for anyone else.
fn greeting(user: &UserData, l10n: &Localizer) -> Option<String> {
    if !user.is_authenticated {
        return None;
    }
    let username = user.username.as_deref()?;
    Some(Localizer::interpolate(
        &l10n.gettext("Welcome back, %(username)s!"),
        &[("username", username)],
    ))
}
