//! Client-side configuration for the bootstrap and the session fetch.
//!
//! The defaults match the markup and endpoints served by the site. Embedders
//! and tests can override individual fields with struct update syntax.

use core::time::Duration;

/// Id of the element the UI tree is mounted into.
pub const CONTAINER_ID: &str = "react-container";
/// Attribute on the container naming the UI tree to mount.
pub const COMPONENT_ATTRIBUTE: &str = "data-component-name";
/// Selects whose owning form is submitted on every `change` event.
pub const AUTOSUBMIT_SELECTOR: &str = "select.autosubmit";
/// Endpoint that describes the current visitor.
pub const WHOAMI_ENDPOINT: &str = "/api/v1/whoami";
/// Upper bound on how long the session request may take before the
/// session is treated as unavailable.
pub const WHOAMI_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub container_id: String,
    pub component_attribute: String,
    pub autosubmit_selector: String,
    pub whoami_endpoint: String,
    pub whoami_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            container_id: CONTAINER_ID.to_owned(),
            component_attribute: COMPONENT_ATTRIBUTE.to_owned(),
            autosubmit_selector: AUTOSUBMIT_SELECTOR.to_owned(),
            whoami_endpoint: WHOAMI_ENDPOINT.to_owned(),
            whoami_timeout: WHOAMI_TIMEOUT,
        }
    }
}
