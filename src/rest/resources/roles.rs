//! Role resource. Roles are addressed by name.

use serde::{Deserialize, Serialize};

use crate::client::GraylogClient;
use crate::clients::ApiError;
use crate::rest::{decode_lenient, segment};

const ROLES_PATH: &str = "/api/roles";

/// A named set of permissions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Role {
    /// The role name; also its identifier.
    pub name: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Permission strings, e.g. `streams:read`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    /// Whether the role is built in.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

/// Role operations.
#[derive(Clone, Copy, Debug)]
pub struct Roles<'a> {
    client: &'a GraylogClient,
}

impl<'a> Roles<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Creates a role.
    ///
    /// Returns the server's copy, or `role` itself when the server answers
    /// without a name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn create(&self, role: &Role) -> Result<Role, ApiError> {
        let response = self
            .client
            .http()
            .post(ROLES_PATH, serde_json::to_value(role)?)
            .await?;
        Ok(decode_lenient(&response)
            .filter(|created: &Role| !created.name.is_empty())
            .unwrap_or_else(|| role.clone()))
    }

    /// Fetches a role by name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the role does not exist.
    pub async fn get(&self, name: &str) -> Result<Role, ApiError> {
        self.client
            .http()
            .get(format!("{ROLES_PATH}/{}", segment(name)))
            .await?
            .decode("role")
    }

    /// Updates a role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(&self, name: &str, role: &Role) -> Result<Role, ApiError> {
        let response = self
            .client
            .http()
            .put(
                format!("{ROLES_PATH}/{}", segment(name)),
                serde_json::to_value(role)?,
            )
            .await?;
        Ok(decode_lenient(&response)
            .filter(|updated: &Role| !updated.name.is_empty())
            .unwrap_or_else(|| Role {
                name: name.to_string(),
                ..role.clone()
            }))
    }

    /// Deletes a role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the role does not exist.
    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{ROLES_PATH}/{}", segment(name)))
            .await?;
        Ok(())
    }
}
