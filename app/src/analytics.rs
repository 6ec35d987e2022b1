//! Google Analytics reporting for the initial page load.
//!
//! Once the visitor's session is known, a few custom dimensions describing
//! the visitor are set and then the page view for the initial load is sent.
//! The order of those commands is fixed; see [`report_session`].

extern crate alloc;
use alloc::rc::Rc;
use core::fmt;

use crate::location::{AddressBar, strip_tracking_params};
use crate::session::UserData;

/// Waffle flag that marks visitors with in-place section editing.
pub const SECTION_EDIT_FLAG: &str = "section_edit";

/// Custom dimensions configured for the site's analytics property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    IsAuthenticated,
    IsBetaTester,
    SectionEditEnabled,
    IsStaff,
}

impl Dimension {
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::IsAuthenticated => "dimension1",
            Self::IsBetaTester => "dimension2",
            Self::SectionEditEnabled => "dimension9",
            Self::IsStaff => "dimension18",
        }
    }
}

/// A `pageview` hit together with the callback to run once it was reported.
pub struct PageView {
    hit_callback: Box<dyn FnOnce()>,
}

impl PageView {
    pub fn new(hit_callback: impl FnOnce() + 'static) -> Self {
        Self {
            hit_callback: Box::new(hit_callback),
        }
    }

    /// Runs the hit callback. Called by the sink once the hit was delivered.
    pub fn complete(self) {
        (self.hit_callback)();
    }
}

impl fmt::Debug for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageView").finish_non_exhaustive()
    }
}

/// The two call shapes of the analytics command queue.
#[derive(Debug)]
pub enum GaCommand {
    /// `ga('set', field, value)`
    Set {
        field: &'static str,
        value: &'static str,
    },
    /// `ga('send', {hitType: 'pageview', hitCallback})`
    Send(PageView),
}

impl GaCommand {
    #[must_use]
    pub const fn enable(dimension: Dimension) -> Self {
        Self::Set {
            field: dimension.field(),
            value: "Yes",
        }
    }
}

/// Destination for analytics commands.
pub trait Analytics {
    fn dispatch(&self, command: GaCommand);
}

/// Dimensions to enable for `user`, in the order they are reported.
#[must_use]
pub fn session_dimensions(user: &UserData) -> Vec<Dimension> {
    let mut dimensions = Vec::with_capacity(4);
    if user.is_authenticated {
        dimensions.push(Dimension::IsAuthenticated);
        if user.is_beta_tester {
            dimensions.push(Dimension::IsBetaTester);
        }
        if user.is_staff {
            dimensions.push(Dimension::IsStaff);
        }
    }
    if user.waffle.flag(SECTION_EDIT_FLAG) {
        dimensions.push(Dimension::SectionEditEnabled);
    }
    dimensions
}

/// Reports a freshly resolved session.
///
/// Sets the visitor dimensions, then sends the page view for the initial
/// load. When the hit has been delivered, tracking parameters are removed
/// from the address bar.
pub fn report_session(analytics: &dyn Analytics, user: &UserData, address_bar: Rc<dyn AddressBar>) {
    for dimension in session_dimensions(user) {
        analytics.dispatch(GaCommand::enable(dimension));
    }
    analytics.dispatch(GaCommand::Send(PageView::new(move || {
        strip_tracking_params(address_bar.as_ref());
    })));
}

/// [`Analytics`] sink forwarding to the page's `window.ga` command queue.
///
/// Commands are dropped when analytics is not loaded, for example because a
/// content blocker removed it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleAnalytics;

impl Analytics for GoogleAnalytics {
    fn dispatch(&self, command: GaCommand) {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen::{JsCast as _, JsValue, closure::Closure};

            let Some(window) = web_sys::window() else {
                return;
            };
            let ga = js_sys::Reflect::get(&window, &JsValue::from_str("ga")).ok();
            let Some(ga) = ga.as_ref().and_then(|ga| ga.dyn_ref::<js_sys::Function>()) else {
                leptos::logging::log!("analytics not loaded; dropping {command:?}");
                return;
            };

            let result = match command {
                GaCommand::Set { field, value } => ga.call3(
                    &JsValue::NULL,
                    &JsValue::from_str("set"),
                    &JsValue::from_str(field),
                    &JsValue::from_str(value),
                ),
                GaCommand::Send(page_view) => {
                    let hit = js_sys::Object::new();
                    let callback = Closure::once_into_js(move || page_view.complete());
                    js_sys::Reflect::set(&hit, &JsValue::from_str("hitType"), &JsValue::from_str("pageview"))
                        .and_then(|_| js_sys::Reflect::set(&hit, &JsValue::from_str("hitCallback"), &callback))
                        .and_then(|_| ga.call2(&JsValue::NULL, &JsValue::from_str("send"), &hit))
                }
            };
            if let Err(err) = result {
                leptos::logging::warn!("analytics call failed: {err:?}");
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = command;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::cell::RefCell;

    use crate::location::MockAddressBar;
    use crate::session::{DEFAULT_USER_DATA, Waffle};

    /// What a sink observed, with page views reduced to a marker.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Recorded {
        Set(&'static str, &'static str),
        PageView,
    }

    /// Records commands and keeps page views so tests can complete them.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) calls: RefCell<Vec<Recorded>>,
        pub(crate) page_views: RefCell<Vec<PageView>>,
    }

    impl Analytics for RecordingSink {
        fn dispatch(&self, command: GaCommand) {
            match command {
                GaCommand::Set { field, value } => {
                    self.calls.borrow_mut().push(Recorded::Set(field, value));
                }
                GaCommand::Send(page_view) => {
                    self.calls.borrow_mut().push(Recorded::PageView);
                    self.page_views.borrow_mut().push(page_view);
                }
            }
        }
    }

    fn idle_address_bar() -> Rc<dyn AddressBar> {
        let mut bar = MockAddressBar::new();
        bar.expect_search().return_const(String::new());
        Rc::new(bar)
    }

    fn user_with_flags(flags: &[(&str, bool)]) -> UserData {
        UserData {
            waffle: Waffle {
                flags: flags.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect(),
                ..Waffle::default()
            },
            ..DEFAULT_USER_DATA
        }
    }

    #[test]
    fn test_dimension_fields() {
        assert_eq!(Dimension::IsAuthenticated.field(), "dimension1");
        assert_eq!(Dimension::IsBetaTester.field(), "dimension2");
        assert_eq!(Dimension::SectionEditEnabled.field(), "dimension9");
        assert_eq!(Dimension::IsStaff.field(), "dimension18");
    }

    #[test]
    fn test_anonymous_visitor_has_no_dimensions() {
        assert!(session_dimensions(&DEFAULT_USER_DATA).is_empty());
    }

    #[test]
    fn test_role_dimensions_require_authentication() {
        let user = UserData {
            is_beta_tester: true,
            is_staff: true,
            ..DEFAULT_USER_DATA
        };

        assert!(session_dimensions(&user).is_empty());
    }

    #[test]
    fn test_all_dimensions_in_order() {
        let user = UserData {
            is_authenticated: true,
            is_beta_tester: true,
            is_staff: true,
            ..user_with_flags(&[(SECTION_EDIT_FLAG, true)])
        };

        assert_eq!(session_dimensions(&user), vec![
            Dimension::IsAuthenticated,
            Dimension::IsBetaTester,
            Dimension::IsStaff,
            Dimension::SectionEditEnabled,
        ]);
    }

    #[test]
    fn test_section_edit_independent_of_authentication() {
        let enabled = user_with_flags(&[(SECTION_EDIT_FLAG, true)]);
        let disabled = user_with_flags(&[(SECTION_EDIT_FLAG, false)]);

        assert_eq!(session_dimensions(&enabled), vec![Dimension::SectionEditEnabled]);
        assert!(session_dimensions(&disabled).is_empty());
    }

    #[test]
    fn test_report_ends_with_single_page_view() {
        let sink = RecordingSink::default();
        let user = UserData {
            is_authenticated: true,
            ..DEFAULT_USER_DATA
        };

        report_session(&sink, &user, idle_address_bar());

        assert_eq!(*sink.calls.borrow(), vec![
            Recorded::Set("dimension1", "Yes"),
            Recorded::PageView,
        ]);
        assert_eq!(sink.page_views.borrow().len(), 1);
    }

    #[test]
    fn test_page_view_callback_cleans_address_bar() {
        let sink = RecordingSink::default();
        let mut bar = MockAddressBar::new();
        bar.expect_search()
            .return_const("?utm_campaign=launch".to_owned());
        bar.expect_pathname().return_const("/en-US/".to_owned());
        bar.expect_replace_path()
            .withf(|path| path == "/en-US/")
            .times(1)
            .return_const(());

        report_session(&sink, &DEFAULT_USER_DATA, Rc::new(bar));
        let page_view = sink.page_views.borrow_mut().pop().unwrap();
        page_view.complete();
    }

    #[test]
    fn test_page_view_debug_output() {
        let page_view = PageView::new(|| {});

        assert_eq!(format!("{page_view:?}"), "PageView { .. }");
    }
}
