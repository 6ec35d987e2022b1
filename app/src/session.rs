//! The visitor's session: who they are and which feature flags apply.
//!
//! A [`UserSession`] is created once per page load and passed explicitly to
//! every view that needs it. When the root view mounts, the session requests
//! `/api/v1/whoami` exactly once; the response is mapped onto [`UserData`] and
//! published through a signal, so views reading the session re-render when it
//! resolves. The resolved value never changes afterwards.
//!
//! Until the request settles, [`UserSession::user`] returns `None`. Views should
//! treat that as "unknown", not as "anonymous". If the request fails the
//! session settles as failed and [`UserSession::user_or_default`] yields the
//! anonymous [`DEFAULT_USER_DATA`].

extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::sync::Arc;
use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{Analytics, report_session};
use crate::config::ClientConfig;
use crate::location::AddressBar;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GravatarUrl {
    pub small: Option<String>,
    pub large: Option<String>,
}

/// Feature flag state, one map per waffle category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Waffle {
    pub flags: BTreeMap<String, bool>,
    pub switches: BTreeMap<String, bool>,
    pub samples: BTreeMap<String, bool>,
}

impl Waffle {
    /// `true` only if the flag is present and active.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn switch(&self, name: &str) -> bool {
        self.switches.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn sample(&self, name: &str) -> bool {
        self.samples.get(name).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub username: Option<String>,
    pub is_authenticated: bool,
    pub is_beta_tester: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub timezone: Option<String>,
    pub gravatar_url: GravatarUrl,
    pub waffle: Waffle,
}

/// The anonymous visitor.
pub const DEFAULT_USER_DATA: UserData = UserData {
    username: None,
    is_authenticated: false,
    is_beta_tester: false,
    is_staff: false,
    is_superuser: false,
    timezone: None,
    gravatar_url: GravatarUrl {
        small: None,
        large: None,
    },
    waffle: Waffle {
        flags: BTreeMap::new(),
        switches: BTreeMap::new(),
        samples: BTreeMap::new(),
    },
};

impl Default for UserData {
    fn default() -> Self {
        DEFAULT_USER_DATA
    }
}

/// Body of the whoami endpoint, in the server's naming.
///
/// Absent keys take their anonymous defaults; keys of the wrong type are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoamiResponse {
    pub username: Option<String>,
    pub is_authenticated: bool,
    pub is_beta_tester: bool,
    pub is_staff: bool,
    pub is_super_user: bool,
    pub timezone: Option<String>,
    pub gravatar_url: GravatarUrl,
    pub waffle: Waffle,
}

impl WhoamiResponse {
    /// # Errors
    ///
    /// Returns [`SessionError::Parse`] if `body` is not a whoami document.
    pub fn from_json(body: &str) -> Result<Self, SessionError> {
        serde_json::from_str(body).map_err(|err| SessionError::Parse(err.to_string()))
    }
}

impl From<WhoamiResponse> for UserData {
    fn from(response: WhoamiResponse) -> Self {
        Self {
            username: response.username,
            is_authenticated: response.is_authenticated,
            is_beta_tester: response.is_beta_tester,
            is_staff: response.is_staff,
            is_superuser: response.is_super_user,
            timezone: response.timezone,
            gravatar_url: response.gravatar_url,
            waffle: response.waffle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session request failed: {0}")]
    Network(String),
    #[error("session endpoint answered with HTTP {0}")]
    Status(u16),
    #[error("malformed session response: {0}")]
    Parse(String),
    #[error("session request timed out after {0:?}")]
    Timeout(Duration),
    #[error("session endpoint is only reachable from the browser")]
    Unavailable,
}

/// Where a session is in its one-way lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unresolved,
    Resolved(UserData),
    Failed(SessionError),
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&UserData> {
        match self {
            Self::Resolved(user) => Some(user),
            Self::Unresolved | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// How a session request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Resolved,
    Failed,
    /// The owning view was torn down before the response arrived.
    Discarded,
}

/// Shared handle to the page's session. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct UserSession {
    state: ArcRwSignal<SessionState>,
    requested: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl UserSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ArcRwSignal::new(SessionState::Unresolved),
            requested: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current state, tracked by the surrounding reactive scope.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    #[must_use]
    pub fn state_untracked(&self) -> SessionState {
        self.state.get_untracked()
    }

    /// The resolved record, or `None` while unresolved or after a failure.
    #[must_use]
    pub fn user(&self) -> Option<UserData> {
        self.state.with(|state| state.user().cloned())
    }

    #[must_use]
    pub fn user_or_default(&self) -> UserData {
        self.user().unwrap_or(DEFAULT_USER_DATA)
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Ignores any response that arrives from now on.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Claims the session's single request.
    ///
    /// The first call returns a task that awaits `fetch`, stores the outcome
    /// and, on success, reports the session to `analytics`. Every later call
    /// returns `None` without touching `fetch`.
    pub fn load<F>(
        &self,
        fetch: F,
        analytics: Rc<dyn Analytics>,
        address_bar: Rc<dyn AddressBar>,
    ) -> Option<impl Future<Output = LoadOutcome> + use<F>>
    where
        F: Future<Output = Result<WhoamiResponse, SessionError>>,
    {
        if self.requested.swap(true, Ordering::AcqRel) {
            return None;
        }
        let session = self.clone();
        Some(async move {
            let result = fetch.await;
            session.settle(result, analytics.as_ref(), address_bar)
        })
    }

    fn settle(
        &self,
        result: Result<WhoamiResponse, SessionError>,
        analytics: &dyn Analytics,
        address_bar: Rc<dyn AddressBar>,
    ) -> LoadOutcome {
        if self.cancelled.load(Ordering::Acquire) {
            leptos::logging::log!("session response arrived after teardown; ignoring it");
            return LoadOutcome::Discarded;
        }
        match result {
            Ok(response) => {
                let user = UserData::from(response);
                self.state.set(SessionState::Resolved(user.clone()));
                report_session(analytics, &user, address_bar);
                LoadOutcome::Resolved
            }
            Err(err) => {
                leptos::logging::warn!("falling back to anonymous session: {err}");
                self.state.set(SessionState::Failed(err));
                LoadOutcome::Failed
            }
        }
    }

    /// Ties the session to the view being built.
    ///
    /// In the browser the whoami request starts once the view has mounted.
    /// When the view is torn down, a response still in flight is ignored.
    pub fn attach(&self, config: &ClientConfig) {
        #[cfg(feature = "hydrate")]
        {
            use crate::analytics::GoogleAnalytics;
            use crate::location::BrowserAddressBar;

            let session = self.clone();
            let endpoint = config.whoami_endpoint.clone();
            let timeout = config.whoami_timeout;
            Effect::new(move || {
                let fetch = fetch_whoami(endpoint.clone(), timeout);
                if let Some(task) = session.load(fetch, Rc::new(GoogleAnalytics), Rc::new(BrowserAddressBar)) {
                    leptos::task::spawn_local(async move {
                        let outcome = task.await;
                        leptos::logging::log!("session request finished: {outcome:?}");
                    });
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = config;
        }

        let session = self.clone();
        on_cleanup(move || session.cancel());
    }
}

impl Default for UserSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Requests the whoami document, giving up after `timeout`.
///
/// # Errors
///
/// Returns a [`SessionError`] describing why no session could be read.
#[allow(clippy::unused_async)]
pub async fn fetch_whoami(endpoint: String, timeout: Duration) -> Result<WhoamiResponse, SessionError> {
    #[cfg(feature = "hydrate")]
    {
        use futures::future::{Either, select};

        let request = Box::pin(async move {
            let response = gloo_net::http::Request::get(&endpoint)
                .send()
                .await
                .map_err(|err| SessionError::Network(err.to_string()))?;
            if !response.ok() {
                return Err(SessionError::Status(response.status()));
            }
            let body = response
                .text()
                .await
                .map_err(|err| SessionError::Network(err.to_string()))?;
            WhoamiResponse::from_json(&body)
        });
        let deadline = Box::pin(gloo_timers::future::sleep(timeout));

        match select(request, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(SessionError::Timeout(timeout)),
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (endpoint, timeout);
        Err(SessionError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    use assert_matches::assert_matches;
    use serde_json::json;

    use crate::analytics::tests::{Recorded, RecordingSink};
    use crate::location::MockAddressBar;

    fn quiet_address_bar() -> Rc<dyn AddressBar> {
        let mut bar = MockAddressBar::new();
        bar.expect_search().return_const(String::new());
        Rc::new(bar)
    }

    fn response(value: serde_json::Value) -> WhoamiResponse {
        WhoamiResponse::from_json(&value.to_string()).unwrap()
    }

    #[test]
    fn test_default_user_data_is_anonymous() {
        let user = UserData::default();

        assert_eq!(user, DEFAULT_USER_DATA);
        assert!(user.username.is_none());
        assert!(!user.is_authenticated);
        assert!(!user.is_beta_tester);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert!(user.timezone.is_none());
        assert_eq!(user.gravatar_url, GravatarUrl::default());
        assert!(user.waffle.flags.is_empty());
        assert!(user.waffle.switches.is_empty());
        assert!(user.waffle.samples.is_empty());
    }

    #[test]
    fn test_whoami_maps_field_for_field() {
        let user = UserData::from(response(json!({
            "username": "wiki-editor",
            "is_authenticated": true,
            "is_beta_tester": false,
            "is_staff": true,
            "is_super_user": true,
            "timezone": "US/Pacific",
            "gravatar_url": {
                "small": "https://secure.gravatar.com/avatar/abc?s=50",
                "large": "https://secure.gravatar.com/avatar/abc?s=200"
            },
            "waffle": {
                "flags": {"section_edit": true, "kumaediting": false},
                "switches": {"welcome_email": true},
                "samples": {"sample_rollout": false}
            }
        })));

        assert_eq!(user.username.as_deref(), Some("wiki-editor"));
        assert!(user.is_authenticated);
        assert!(!user.is_beta_tester);
        assert!(user.is_staff);
        assert!(user.is_superuser);
        assert_eq!(user.timezone.as_deref(), Some("US/Pacific"));
        assert_eq!(
            user.gravatar_url.large.as_deref(),
            Some("https://secure.gravatar.com/avatar/abc?s=200")
        );
        assert!(user.waffle.flag("section_edit"));
        assert!(!user.waffle.flag("kumaediting"));
        assert!(user.waffle.switch("welcome_email"));
        assert!(!user.waffle.sample("sample_rollout"));
        assert_eq!(user.waffle.samples.len(), 1);
    }

    #[test]
    fn test_whoami_missing_keys_default() {
        let user = UserData::from(response(json!({"is_authenticated": true})));

        assert_eq!(user, UserData {
            is_authenticated: true,
            ..DEFAULT_USER_DATA
        });
    }

    #[test]
    fn test_whoami_rejects_wrong_shapes() {
        assert_matches!(
            WhoamiResponse::from_json(r#"{"is_authenticated": "yes"}"#),
            Err(SessionError::Parse(_))
        );
        assert_matches!(
            WhoamiResponse::from_json(r#"{"waffle": {"flags": ["section_edit"]}}"#),
            Err(SessionError::Parse(_))
        );
        assert_matches!(
            WhoamiResponse::from_json("<html>Service Unavailable</html>"),
            Err(SessionError::Parse(_))
        );
    }

    #[test]
    fn test_new_session_is_unresolved() {
        let session = UserSession::new();

        assert_eq!(session.state_untracked(), SessionState::Unresolved);
        assert!(session.user().is_none());
        assert!(!session.is_requested());
        assert_eq!(session.user_or_default(), DEFAULT_USER_DATA);
    }

    #[test]
    fn test_resolution_reports_in_fixed_order() {
        let session = UserSession::new();
        let sink = Rc::new(RecordingSink::default());
        let body = response(json!({
            "is_authenticated": true,
            "is_beta_tester": true,
            "is_staff": false,
            "waffle": {"flags": {"section_edit": true}}
        }));

        let task = session
            .load(async move { Ok::<_, SessionError>(body) }, sink.clone(), quiet_address_bar())
            .unwrap();
        assert!(sink.calls.borrow().is_empty());

        let outcome = tokio_test::block_on(task);

        assert_eq!(outcome, LoadOutcome::Resolved);
        assert_eq!(*sink.calls.borrow(), vec![
            Recorded::Set("dimension1", "Yes"),
            Recorded::Set("dimension2", "Yes"),
            Recorded::Set("dimension9", "Yes"),
            Recorded::PageView,
        ]);
        assert!(!sink.calls.borrow().contains(&Recorded::Set("dimension18", "Yes")));
    }

    #[test]
    fn test_request_is_issued_once() {
        let session = UserSession::new();
        let sink = Rc::new(RecordingSink::default());
        let polls = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let polls = polls.clone();
            let fetch = async move {
                polls.set(polls.get() + 1);
                Ok::<_, SessionError>(WhoamiResponse::default())
            };
            if let Some(task) = session.load(fetch, sink.clone(), quiet_address_bar()) {
                tokio_test::block_on(task);
            }
        }

        assert_eq!(polls.get(), 1);
        assert!(session.is_requested());
        assert_eq!(
            sink.calls.borrow().iter().filter(|c| **c == Recorded::PageView).count(),
            1
        );
    }

    #[test]
    fn test_clones_observe_resolution() {
        let session = UserSession::new();
        let consumer = session.clone();
        let sink = Rc::new(RecordingSink::default());

        assert!(consumer.user().is_none());

        let task = session
            .load(
                async { Ok::<_, SessionError>(response(json!({"username": "mdn", "is_authenticated": true}))) },
                sink,
                quiet_address_bar(),
            )
            .unwrap();
        tokio_test::block_on(task);

        let user = consumer.user().unwrap();
        assert_eq!(user.username.as_deref(), Some("mdn"));
        assert!(consumer.state_untracked().is_settled());
        let again = consumer.load(
            async { Ok::<_, SessionError>(WhoamiResponse::default()) },
            Rc::new(RecordingSink::default()),
            quiet_address_bar(),
        );
        assert!(again.is_none());
        assert_eq!(consumer.user(), Some(user));
    }

    #[test]
    fn test_failure_falls_back_without_analytics() {
        let session = UserSession::new();
        let sink = Rc::new(RecordingSink::default());

        let task = session
            .load(async { Err::<WhoamiResponse, _>(SessionError::Status(503)) }, sink.clone(), quiet_address_bar())
            .unwrap();
        let outcome = tokio_test::block_on(task);

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(
            session.state_untracked(),
            SessionState::Failed(SessionError::Status(503))
        );
        assert!(session.user().is_none());
        assert_eq!(session.user_or_default(), DEFAULT_USER_DATA);
        assert!(sink.calls.borrow().is_empty());
    }

    #[test]
    fn test_late_response_after_cancel_is_ignored() {
        let session = UserSession::new();
        let sink = Rc::new(RecordingSink::default());

        let task = session
            .load(
                async { Ok::<_, SessionError>(response(json!({"is_authenticated": true}))) },
                sink.clone(),
                quiet_address_bar(),
            )
            .unwrap();
        session.cancel();
        let outcome = tokio_test::block_on(task);

        assert_eq!(outcome, LoadOutcome::Discarded);
        assert_eq!(session.state_untracked(), SessionState::Unresolved);
        assert!(sink.calls.borrow().is_empty());
    }

    #[cfg(not(feature = "hydrate"))]
    #[test]
    fn test_fetch_outside_browser_is_unavailable() {
        let result = tokio_test::block_on(fetch_whoami(
            "/api/v1/whoami".to_owned(),
            Duration::from_secs(1),
        ));

        assert_eq!(result, Err(SessionError::Unavailable));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SessionError::Status(500).to_string(),
            "session endpoint answered with HTTP 500"
        );
        assert_eq!(
            SessionError::Timeout(Duration::from_secs(10)).to_string(),
            "session request timed out after 10s"
        );
    }
}
