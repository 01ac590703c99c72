//! User resource. Users are addressed by username.
//!
//! Graylog 7 updates users by object id and toggles the disabled state
//! through dedicated endpoints; earlier releases take a snake_case body by
//! username and change passwords with a separate call.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::GraylogClient;
use crate::clients::ApiError;
use crate::config::ApiGeneration;
use crate::rest::{decode_lenient, segment};

const USERS_PATH: &str = "/api/users";

/// A Graylog user.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct User {
    /// The user's object id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Login name.
    pub username: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    /// Role names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// IANA time zone, e.g. `Europe/Berlin`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub session_timeout_ms: i64,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,

    /// Write-only; never populated on read.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("disabled", &self.disabled)
            .field("password", &if self.password.is_empty() { "" } else { "*****" })
            .finish_non_exhaustive()
    }
}

/// Splits `"First Last Name"` into `("First", "Last Name")` at the first
/// space.
fn split_full_name(full_name: &str) -> (&str, &str) {
    match full_name.find(' ') {
        Some(index) if index > 0 => (
            full_name[..index].trim(),
            full_name[index + 1..].trim(),
        ),
        _ => (full_name, ""),
    }
}

impl User {
    fn create_body(&self) -> Value {
        let (first_name, last_name) = split_full_name(&self.full_name);
        json!({
            "username": self.username,
            "first_name": first_name,
            "last_name": last_name,
            "email": self.email,
            "roles": self.roles,
            "permissions": [],
            "timezone": self.timezone,
            "session_timeout_ms": self.session_timeout_ms,
            "password": self.password,
        })
    }

    fn modern_update_body(&self) -> Value {
        let mut body = Map::new();
        if !self.full_name.is_empty() {
            body.insert("fullName".to_string(), json!(self.full_name));
        }
        body.insert("disabled".to_string(), json!(self.disabled));
        if !self.roles.is_empty() {
            body.insert("roles".to_string(), json!(self.roles));
        }
        if !self.email.is_empty() {
            body.insert("email".to_string(), json!(self.email));
        }
        Value::Object(body)
    }
}

/// User operations.
#[derive(Clone, Copy, Debug)]
pub struct Users<'a> {
    client: &'a GraylogClient,
}

impl<'a> Users<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    /// Creates a user.
    ///
    /// `full_name` is sent as `first_name`/`last_name`. Releases that answer
    /// without the created user are followed by a read.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn create(&self, user: &User) -> Result<User, ApiError> {
        let response = self.client.http().post(USERS_PATH, user.create_body()).await?;
        match decode_lenient::<User>(&response).filter(|created| !created.username.is_empty()) {
            Some(created) => Ok(User {
                password: String::new(),
                ..created
            }),
            None => self.get(&user.username).await,
        }
    }

    /// Fetches a user by username. The password is always empty.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the user does not exist.
    pub async fn get(&self, username: &str) -> Result<User, ApiError> {
        let user: User = self
            .client
            .http()
            .get(format!("{USERS_PATH}/{}", segment(username)))
            .await?
            .decode("user")?;
        Ok(User {
            password: String::new(),
            ..user
        })
    }

    /// Updates a user and returns the re-read state.
    ///
    /// A non-empty `password` is applied with a separate password change on
    /// Graylog 5 and 6.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if any of the calls fails.
    pub async fn update(&self, username: &str, user: &User) -> Result<User, ApiError> {
        if self.client.generation() == ApiGeneration::Gen7 {
            return self.update_by_id(username, user).await;
        }

        let body = serde_json::to_value(User {
            id: None,
            password: String::new(),
            ..user.clone()
        })?;
        self.client
            .http()
            .put(format!("{USERS_PATH}/{}", segment(username)), body)
            .await?;

        if !user.password.is_empty() {
            self.client
                .http()
                .put(
                    format!("{USERS_PATH}/{}/password", segment(username)),
                    json!({ "password": user.password }),
                )
                .await?;
        }
        self.get(username).await
    }

    async fn update_by_id(&self, username: &str, user: &User) -> Result<User, ApiError> {
        let current = self.get(username).await?;
        let target = current
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(username);
        let path = format!("{USERS_PATH}/{}", segment(target));

        self.client.http().put(&path, user.modern_update_body()).await?;

        if current.id.is_some() {
            let toggle = if user.disabled { "disable" } else { "enable" };
            if let Err(e) = self.client.http().post_empty(format!("{path}/{toggle}")).await {
                if matches!(e, ApiError::Cancelled) {
                    return Err(e);
                }
                tracing::debug!("Could not {toggle} user {username}: {e}");
            }
        }
        self.get(username).await
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the user does not exist.
    pub async fn delete(&self, username: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{USERS_PATH}/{}", segment(username)))
            .await?;
        Ok(())
    }
}
