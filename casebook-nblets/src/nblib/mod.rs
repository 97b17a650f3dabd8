//! Shared helpers for notebooklet implementations: host resolution and
//! enrichment, alert fetching, and cloud resource API lookups.

pub mod alert;
pub mod azure;
pub mod host;
pub mod iptools;

/// Names of the provider queries the notebooklets run.
pub mod queries {
    /// Event records used to resolve a host name.
    pub const HOST_EVENTS: &str = "host_events";
    /// Latest agent heartbeat per host.
    pub const HEARTBEAT: &str = "heartbeat";
    /// Azure network topology records.
    pub const AZ_NETWORK_ANALYTICS: &str = "az_network_analytics";
    /// Alerts related to an entity.
    pub const RELATED_ALERTS: &str = "related_alerts";
    /// Investigation bookmarks related to an entity.
    pub const ENTITY_BOOKMARKS: &str = "entity_bookmarks";
    /// Logon events for an account.
    pub const ACCOUNT_LOGONS: &str = "account_logons";
}
