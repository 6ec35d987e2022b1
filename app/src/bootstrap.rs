//! Deciding what to mount and how.
//!
//! The browser entry point reads the mount point's component name, whether the
//! mount point already holds server-rendered markup, and the page data. From
//! those it asks [`plan_mount`] for a [`MountPlan`] and then only executes it.

use leptos::prelude::*;
use leptos_meta::provide_meta_context;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::l10n::{L10nError, Localizer};
use crate::session::UserSession;
use crate::types::{DocumentData, MountData};
use crate::{landing, spa};

/// Component name of the single page app (documents and search).
pub const SINGLE_PAGE_APP: &str = "SPA";
/// Component name of the homepage.
pub const LANDING_PAGE: &str = "landing";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("malformed page data: {0}")]
    Parse(String),
    #[error("Cannot render or hydrate unknown component: {0}")]
    UnknownComponent(String),
    #[error(transparent)]
    Localization(#[from] L10nError),
    #[error("no browser window available")]
    MissingWindow,
}

/// How the UI tree is attached to the mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    /// Attach to markup the server already rendered.
    Hydrate,
    /// Build the markup in the empty mount point.
    Render,
}

impl MountMode {
    #[must_use]
    pub const fn for_container(has_rendered_children: bool) -> Self {
        if has_rendered_children {
            Self::Hydrate
        } else {
            Self::Render
        }
    }
}

/// The top-level UI tree selected by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppView {
    SinglePage {
        initial_url: String,
        initial_data: Option<DocumentData>,
    },
    Landing,
}

impl AppView {
    /// Maps a component name to its UI tree.
    ///
    /// # Errors
    ///
    /// Any name other than [`SINGLE_PAGE_APP`] or [`LANDING_PAGE`] is a
    /// mismatch between server and client and fails with
    /// [`BootstrapError::UnknownComponent`].
    pub fn select(
        component_name: &str,
        initial_url: String,
        initial_data: Option<DocumentData>,
    ) -> Result<Self, BootstrapError> {
        match component_name {
            SINGLE_PAGE_APP => Ok(Self::SinglePage {
                initial_url,
                initial_data,
            }),
            LANDING_PAGE => Ok(Self::Landing),
            other => Err(BootstrapError::UnknownComponent(other.to_owned())),
        }
    }
}

#[derive(Debug)]
pub struct MountPlan {
    pub mode: MountMode,
    pub view: AppView,
    pub l10n: Localizer,
}

/// Parses the page data and plans the mount.
///
/// `component_name` is the mount point's component attribute, `None` if the
/// attribute is missing.
///
/// # Errors
///
/// Fails if the page data is malformed, its plural rule does not parse, or the
/// component name is unknown.
pub fn plan_mount(
    component_name: Option<&str>,
    has_rendered_children: bool,
    data_json: &str,
) -> Result<MountPlan, BootstrapError> {
    let data: MountData =
        serde_json::from_str(data_json).map_err(|err| BootstrapError::Parse(err.to_string()))?;
    plan_from_data(component_name, has_rendered_children, data)
}

/// Plans the mount from already parsed page data, consuming it.
///
/// # Errors
///
/// See [`plan_mount`].
pub fn plan_from_data(
    component_name: Option<&str>,
    has_rendered_children: bool,
    data: MountData,
) -> Result<MountPlan, BootstrapError> {
    let MountData {
        url,
        document_data,
        locale,
        string_catalog,
        plural_function,
    } = data;

    let l10n = Localizer::new(locale, string_catalog, &plural_function)?;
    let view = AppView::select(component_name.unwrap_or_default(), url, document_data)?;

    Ok(MountPlan {
        mode: MountMode::for_container(has_rendered_children),
        view,
        l10n,
    })
}

impl MountPlan {
    /// Builds the planned UI tree.
    ///
    /// Must run inside the mount closure: the page's [`UserSession`] is
    /// created here and bound to the lifetime of the mounted tree.
    pub fn into_view(self, config: &ClientConfig) -> impl IntoView + use<> {
        provide_meta_context();
        let session = UserSession::new();
        session.attach(config);

        let Self { view, l10n, .. } = self;
        match view {
            AppView::SinglePage {
                initial_url,
                initial_data,
            } => spa::component(initial_url, initial_data, session, l10n).into_any(),
            AppView::Landing => landing::component(session, l10n).into_any(),
        }
    }
}
