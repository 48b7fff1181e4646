use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::utils::time::date_to_api_string;

use super::{
    models::{
        ActionReply, DailyReport, FraudAlertReply, LoginReply, Me, SyncStatus, TopApps, UserInfo,
        WeeklySummary,
    },
    session::Session,
};

/// Errors coming back from the API. Statuses are kept apart so that callers can
/// decide what is fatal: the aggregation layer downgrades all of these to a
/// skipped day, while auth and admin commands report them to the user.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not authorized, log in first")]
    Unauthorized,
    #[error("no data: {0}")]
    NotFound(String),
    #[error("api error {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Thin wrapper over the Workwise REST API. Holds the [Session] it was created
/// with; no global token state exists anywhere in the crate.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn new(session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.session.api_url, path);
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.session.token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
                .unwrap_or_else(|| "Request failed".to_string());
            debug!("Request failed with {status}: {detail}");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
                StatusCode::NOT_FOUND => ApiError::NotFound(detail),
                _ => ApiError::Status {
                    status: status.as_u16(),
                    detail,
                },
            });
        }
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    // ------ auth ------

    /// Exchanges credentials for a token and stores it on the held session.
    /// The caller decides whether to persist the updated session.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let reply: LoginReply = self
            .send(
                self.request(Method::POST, "/api/auth/login")
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        self.session.token = Some(reply.access_token);
        Ok(())
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<ActionReply, ApiError> {
        self.send(
            self.request(Method::POST, "/api/auth/register")
                .json(&json!({ "email": email, "password": password, "name": name })),
        )
        .await
    }

    pub async fn me(&self) -> Result<Me, ApiError> {
        self.get("/api/auth/me", &[]).await
    }

    // ------ analytics ------

    pub async fn daily_report(
        &self,
        date: chrono::NaiveDate,
        user_id: Option<String>,
    ) -> Result<DailyReport, ApiError> {
        let mut query = vec![("date", date_to_api_string(date))];
        if let Some(user_id) = user_id {
            query.push(("user_id", user_id));
        }
        self.get("/api/analytics/desktop/daily-report", &query).await
    }

    pub async fn weekly_summary(&self, user_id: Option<String>) -> Result<WeeklySummary, ApiError> {
        let query: Vec<_> = user_id.map(|id| ("user_id", id)).into_iter().collect();
        self.get("/api/analytics/desktop/weekly-summary", &query).await
    }

    pub async fn top_apps(
        &self,
        days: u32,
        limit: u32,
        user_id: Option<String>,
    ) -> Result<TopApps, ApiError> {
        let mut query = vec![("days", days.to_string()), ("limit", limit.to_string())];
        if let Some(user_id) = user_id {
            query.push(("user_id", user_id));
        }
        self.get("/api/analytics/desktop/top-apps", &query).await
    }

    pub async fn sync_status(&self) -> Result<SyncStatus, ApiError> {
        self.get("/api/sync-status", &[]).await
    }

    // ------ admin ------

    pub async fn employees(&self) -> Result<Vec<UserInfo>, ApiError> {
        self.get("/api/admin/employees", &[]).await
    }

    pub async fn pending_users(&self) -> Result<Vec<UserInfo>, ApiError> {
        self.get("/api/admin/pending-users", &[]).await
    }

    pub async fn approve_user(&self, user_id: &str) -> Result<ActionReply, ApiError> {
        self.send(self.request(Method::POST, &format!("/api/admin/approve-user/{user_id}")))
            .await
    }

    pub async fn reject_user(&self, user_id: &str) -> Result<ActionReply, ApiError> {
        self.send(self.request(Method::POST, &format!("/api/admin/reject-user/{user_id}")))
            .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<ActionReply, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/api/admin/delete-user/{user_id}")))
            .await
    }

    // ------ fraud ------

    pub async fn fraud_alerts(&self, days: u32) -> Result<FraudAlertReply, ApiError> {
        self.get("/api/fraud-alerts", &[("days", days.to_string())]).await
    }
}

#[async_trait::async_trait]
impl super::ReportSource for ApiClient {
    async fn daily_report(
        &self,
        date: chrono::NaiveDate,
        user_id: Option<String>,
    ) -> Result<DailyReport, ApiError> {
        ApiClient::daily_report(self, date, user_id).await
    }
}
