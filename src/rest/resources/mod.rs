//! Per-entity resource clients.
//!
//! Every client is a lightweight handle borrowed from a
//! [`GraylogClient`](crate::GraylogClient):
//!
//! ```rust,ignore
//! let streams = client.streams();
//! let stream = streams.get("5e4f0c...").await?;
//! ```
//!
//! # Path prefixes
//!
//! Most families live under `/api` on every supported release. LDAP
//! settings, classic dashboards and widgets, event notifications, and
//! extractor create/delete live at the server root on Graylog 5 and are
//! prefixed through [`GraylogClient::prefixed`](crate::GraylogClient::prefixed).

mod dashboards;
mod event_definitions;
mod event_notifications;
mod index_sets;
mod inputs;
mod ldap;
mod outputs;
mod pipelines;
mod roles;
mod stream_rules;
mod streams;
mod users;

pub use dashboards::{Dashboard, DashboardWidget, Dashboards};
pub use event_definitions::{EventDefinition, EventDefinitions};
pub use event_notifications::{EventNotification, EventNotifications};
pub use index_sets::{IndexSet, IndexSets};
pub use inputs::{Input, Inputs};
pub use ldap::{LdapSettings, LdapSettingsClient};
pub use outputs::{Output, Outputs};
pub use pipelines::{Pipeline, Pipelines};
pub use roles::{Role, Roles};
pub use stream_rules::{StreamRule, StreamRules};
pub use streams::{Stream, Streams};
pub use users::{User, Users};
