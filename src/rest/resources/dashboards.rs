//! Dashboard resource.
//!
//! Graylog 7 stores dashboards as views of type `DASHBOARD` under
//! `/api/views`, where the description is called `summary`. Earlier
//! releases use the classic `/dashboards` endpoints, which also host the
//! widget API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::GraylogClient;
use crate::clients::{ApiError, CandidateRequest, IdExtractor};
use crate::config::ApiGeneration;
use crate::rest::{decode_lenient, decode_list, segment};

const VIEWS_PATH: &str = "/api/views";

/// A dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Dashboard {
    /// The dashboard id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The dashboard title.
    pub title: String,

    /// Free-form description (`summary` on Graylog 7).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Dashboard {
    /// Reads a view object, taking `title` and `summary` from the root or
    /// from a nested `view` object, the latter winning.
    fn from_view(id: Option<String>, value: &Value) -> Self {
        let mut dashboard = Self {
            id: id.or_else(|| string_field(value, "id")),
            title: string_field(value, "title").unwrap_or_default(),
            description: string_field(value, "summary").unwrap_or_default(),
        };
        if let Some(view) = value.get("view") {
            if let Some(title) = string_field(view, "title") {
                dashboard.title = title;
            }
            if let Some(summary) = string_field(view, "summary") {
                dashboard.description = summary;
            }
        }
        dashboard
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn is_dashboard_view(value: &Value) -> bool {
    value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("dashboard"))
}

/// A widget on a classic dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DashboardWidget {
    /// The widget id. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Widget kind, e.g. `SEARCH_RESULT_COUNT`.
    #[serde(rename = "type")]
    pub widget_type: String,

    /// Cache time in seconds.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_time: u32,

    /// Widget-specific configuration.
    #[serde(default, rename = "config", skip_serializing_if = "Map::is_empty")]
    pub configuration: Map<String, Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Dashboard and widget operations.
#[derive(Clone, Copy, Debug)]
pub struct Dashboards<'a> {
    client: &'a GraylogClient,
}

impl<'a> Dashboards<'a> {
    pub(crate) const fn new(client: &'a GraylogClient) -> Self {
        Self { client }
    }

    fn uses_views(&self) -> bool {
        self.client.generation() == ApiGeneration::Gen7
    }

    fn classic_path(&self) -> String {
        self.client.prefixed("/dashboards")
    }

    fn dashboard_path(&self, id: &str) -> String {
        if self.uses_views() {
            format!("{VIEWS_PATH}/{}", segment(id))
        } else {
            format!("{}/{}", self.classic_path(), segment(id))
        }
    }

    /// Creates a dashboard and returns it with its new id.
    ///
    /// On Graylog 7 three Views API shapes are tried, then the classic
    /// endpoints in case the server is older than it reported.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if no candidate produced an identifier.
    pub async fn create(&self, dashboard: &Dashboard) -> Result<Dashboard, ApiError> {
        let classic_body = serde_json::to_value(Dashboard {
            id: None,
            ..dashboard.clone()
        })?;
        let classic_ids = IdExtractor::new().flat("dashboard_id");

        let candidates = if self.uses_views() {
            let view_ids = IdExtractor::new().wrapped("view");
            vec![
                CandidateRequest::post(
                    "dashboard view",
                    VIEWS_PATH,
                    json!({
                        "type": "DASHBOARD",
                        "title": dashboard.title,
                        "summary": dashboard.description,
                    }),
                    view_ids.clone(),
                )?,
                CandidateRequest::post(
                    "lowercase dashboard view",
                    VIEWS_PATH,
                    json!({
                        "title": dashboard.title,
                        "summary": dashboard.description,
                        "type": "dashboard",
                    }),
                    view_ids.clone(),
                )?,
                CandidateRequest::post(
                    "dashboards view endpoint",
                    format!("{VIEWS_PATH}/dashboards"),
                    json!({"title": dashboard.title, "summary": dashboard.description}),
                    view_ids,
                )?,
                CandidateRequest::post(
                    "classic dashboard",
                    "/api/dashboards",
                    classic_body.clone(),
                    classic_ids.clone(),
                )?,
                CandidateRequest::post(
                    "unprefixed classic dashboard",
                    "/dashboards",
                    classic_body,
                    classic_ids,
                )?,
            ]
        } else {
            vec![CandidateRequest::post(
                "classic dashboard",
                self.classic_path(),
                classic_body,
                classic_ids,
            )?]
        };

        let id = self
            .client
            .negotiator()
            .create_with_negotiation("create dashboard", candidates, None)
            .await?;
        Ok(Dashboard {
            id: Some(id),
            ..dashboard.clone()
        })
    }

    /// Fetches a dashboard by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the dashboard does not exist.
    pub async fn get(&self, id: &str) -> Result<Dashboard, ApiError> {
        let response = self.client.http().get(self.dashboard_path(id)).await?;
        if self.uses_views() {
            let value = response.json_value().ok_or_else(|| ApiError::UnexpectedResponse {
                context: "dashboard view",
                body: response.text(),
            })?;
            return Ok(Dashboard::from_view(Some(id.to_string()), &value));
        }
        response.decode("dashboard")
    }

    /// Lists dashboards. On Graylog 7 only views of type dashboard are
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the listing is malformed.
    pub async fn list(&self) -> Result<Vec<Dashboard>, ApiError> {
        if self.uses_views() {
            let response = self.client.http().get(VIEWS_PATH).await?;
            let views: Vec<Value> = decode_list(&response, "views", "view list")?;
            return Ok(views
                .iter()
                .filter(|view| is_dashboard_view(view))
                .map(|view| Dashboard::from_view(None, view))
                .collect());
        }
        let response = self.client.http().get(self.classic_path()).await?;
        decode_list(&response, "dashboards", "dashboard list")
    }

    /// Updates a dashboard's title and description.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update(&self, id: &str, dashboard: &Dashboard) -> Result<Dashboard, ApiError> {
        let path = self.dashboard_path(id);
        if self.uses_views() {
            let mut body = json!({ "title": dashboard.title });
            if !dashboard.description.is_empty() {
                body["summary"] = Value::String(dashboard.description.clone());
            }
            self.client.http().put(path, body).await?;
            return self.get(id).await;
        }

        let body = serde_json::to_value(Dashboard {
            id: None,
            ..dashboard.clone()
        })?;
        let response = self.client.http().put(path, body).await?;
        Ok(decode_lenient(&response)
            .filter(|updated: &Dashboard| !updated.title.is_empty())
            .unwrap_or_else(|| Dashboard {
                id: Some(id.to_string()),
                ..dashboard.clone()
            }))
    }

    /// Deletes a dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the dashboard does not exist.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.http().delete(self.dashboard_path(id)).await?;
        Ok(())
    }

    fn widgets_path(&self, dashboard_id: &str) -> String {
        self.client
            .prefixed(&format!("/dashboards/{}/widgets", segment(dashboard_id)))
    }

    /// Adds a widget to a classic dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the response carries no id.
    pub async fn create_widget(
        &self,
        dashboard_id: &str,
        widget: &DashboardWidget,
    ) -> Result<DashboardWidget, ApiError> {
        let body = serde_json::to_value(DashboardWidget {
            id: None,
            ..widget.clone()
        })?;
        let id = self
            .client
            .negotiator()
            .create_with_negotiation(
                "create dashboard widget",
                vec![CandidateRequest::post(
                    "widget body",
                    self.widgets_path(dashboard_id),
                    body,
                    IdExtractor::new().flat("widget_id"),
                )?],
                None,
            )
            .await?;
        Ok(DashboardWidget {
            id: Some(id),
            ..widget.clone()
        })
    }

    /// Fetches a widget.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the widget does not exist.
    pub async fn get_widget(
        &self,
        dashboard_id: &str,
        widget_id: &str,
    ) -> Result<DashboardWidget, ApiError> {
        self.client
            .http()
            .get(format!("{}/{}", self.widgets_path(dashboard_id), segment(widget_id)))
            .await?
            .decode("dashboard widget")
    }

    /// Updates a widget.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn update_widget(
        &self,
        dashboard_id: &str,
        widget_id: &str,
        widget: &DashboardWidget,
    ) -> Result<DashboardWidget, ApiError> {
        let body = serde_json::to_value(DashboardWidget {
            id: None,
            ..widget.clone()
        })?;
        let response = self
            .client
            .http()
            .put(
                format!("{}/{}", self.widgets_path(dashboard_id), segment(widget_id)),
                body,
            )
            .await?;
        Ok(decode_lenient(&response)
            .filter(|updated: &DashboardWidget| !updated.widget_type.is_empty())
            .unwrap_or_else(|| DashboardWidget {
                id: Some(widget_id.to_string()),
                ..widget.clone()
            }))
    }

    /// Removes a widget.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the widget does not exist.
    pub async fn delete_widget(&self, dashboard_id: &str, widget_id: &str) -> Result<(), ApiError> {
        self.client
            .http()
            .delete(format!("{}/{}", self.widgets_path(dashboard_id), segment(widget_id)))
            .await?;
        Ok(())
    }
}
