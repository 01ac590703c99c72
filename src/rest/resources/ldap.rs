//! LDAP settings singleton.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::GraylogClient;
use crate::clients::ApiError;
use crate::rest::decode_lenient;

/// Global LDAP settings.
///
/// Fields this crate does not model are kept in `extra` and sent back
/// unchanged on update.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LdapSettings {
    /// Whether LDAP authentication is enabled.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_username: String,

    /// Bind password. Masked in `Debug` output.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_password: String,

    /// e.g. `ldap://ldap.example.com:389`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ldap_uri: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search_base: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search_pattern: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_unique_id_attribute: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_search_base: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_search_pattern: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_group: String,

    #[serde(default)]
    pub use_start_tls: bool,

    #[serde(default)]
    pub trust_all_certificates: bool,

    #[serde(default)]
    pub active_directory: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name_attribute: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email_attribute: String,

    /// Unmodelled fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for LdapSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSettings")
            .field("enabled", &self.enabled)
            .field("ldap_uri", &self.ldap_uri)
            .field("system_username", &self.system_username)
            .field("system_password", &"*****")
            .field("search_base", &self.search_base)
            .field("active_directory", &self.active_directory)
            .finish_non_exhaustive()
    }
}

/// LDAP settings operations.
#[derive(Clone, Copy, Debug)]
pub struct LdapSettingsClient<'a> {
    client: &'a GraylogClient,
}

impl<'a> LdapSettingsClient<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    fn path(&self) -> String {
        self.client.prefixed("/system/ldap/settings")
    }

    /// Fetches the current settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn get(&self) -> Result<LdapSettings, ApiError> {
        self.client.http().get(self.path()).await?.decode("LDAP settings")
    }

    /// Replaces the settings.
    ///
    /// Returns the server's copy, or `settings` when the answer is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(&self, settings: &LdapSettings) -> Result<LdapSettings, ApiError> {
        let response = self
            .client
            .http()
            .put(self.path(), serde_json::to_value(settings)?)
            .await?;
        Ok(decode_lenient(&response).unwrap_or_else(|| settings.clone()))
    }
}
