// Views, localization and session handling for the MDN front end
use crate::components::icons;
use chrono::{Datelike as _, Utc};
use leptos::{
    html::{div, footer, p},
    prelude::*,
};

use crate::l10n::Localizer;

pub mod analytics;
pub mod bootstrap;
mod components;
pub mod config;
mod document;
pub mod l10n;
mod landing;
pub mod location;
pub mod session;
mod spa;
pub mod types;

pub use bootstrap::{AppView, BootstrapError, MountMode, MountPlan, plan_from_data, plan_mount};
pub use config::ClientConfig;
pub use session::{DEFAULT_USER_DATA, SessionState, UserData, UserSession};

fn footer_component(l10n: &Localizer) -> impl IntoView + use<> {
    footer().class("page-footer").child(
        div().class("flex flex-col gap-1 justify-center items-center").child((
            p().class("text-gray-400").child(format!(
                "\u{a9} 2005\u{2013}{} {}",
                Utc::now().year(),
                l10n.gettext("Mozilla and individual contributors.")
            )),
            icons::component(),
        )),
    )
}
