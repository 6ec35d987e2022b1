use icondata::FiUser;
use leptos::{
    html::{a, button, div, form, header, img, nav},
    prelude::*,
    svg::svg,
};

use crate::components::loader;
use crate::l10n::Localizer;
use crate::session::{SessionState, UserData, UserSession};

/// Page header with the site logo and the visitor's user menu.
///
/// The menu follows the session: a loader until it settles, then either the
/// signed-in user or a sign-in link. A failed session renders like an
/// anonymous one.
pub fn component(session: UserSession, l10n: Localizer) -> impl IntoView {
    let locale = l10n.locale().to_owned();

    header().class("page-header").child((
        a().href(format!("/{locale}/"))
            .class("logo")
            .aria_label("MDN Web Docs")
            .child("MDN Web Docs"),
        nav().class("user-menu").child(move || match session.state() {
            SessionState::Unresolved => loader::component(&l10n).into_any(),
            SessionState::Resolved(user) if user.is_authenticated => {
                signed_in(user, &l10n, &locale).into_any()
            }
            SessionState::Resolved(_) | SessionState::Failed(_) => {
                sign_in(&l10n, &locale).into_any()
            }
        }),
    ))
}

/// Sign-in URL that returns the visitor to the locale's homepage.
fn sign_in_url(locale: &str) -> String {
    format!("/users/github/login/?next=/{locale}/")
}

fn profile_url(locale: &str, username: &str) -> String {
    format!("/{locale}/profiles/{username}")
}

fn sign_in(l10n: &Localizer, locale: &str) -> impl IntoView + use<> {
    a().href(sign_in_url(locale)).class("signin-link").child((
        svg()
            .attr("viewBox", FiUser.view_box)
            .inner_html(FiUser.data)
            .class("size-4"),
        l10n.gettext("Sign in"),
    ))
}

fn signed_in(user: UserData, l10n: &Localizer, locale: &str) -> impl IntoView + use<> {
    let username = user.username.unwrap_or_default();

    div().class("signed-in").child((
        user.gravatar_url.small.map(|src| {
            img().src(src).alt("").class("avatar").width("25").height("25")
        }),
        a().href(profile_url(locale, &username)).child(username),
        form().action("/users/signout").method("post").child(
            button().r#type("submit").class("signout").child(l10n.gettext("Sign out")),
        ),
    ))
}
