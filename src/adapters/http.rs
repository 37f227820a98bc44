//! HTTP front end: account routes plus forecast and CSV download.
//!
//! Sessions are looked up through the injected `SessionStore`; a request is
//! authenticated by `Authorization: Bearer <token>` or a `session` cookie.

use crate::core::export;
use crate::core::service::ForecastService;
use crate::core::{ChartRenderer, CredentialStore, SessionStore};
use crate::domain::model::{ForecastMethod, ForecastPoint, Summary};
use crate::utils::error::{ForecastError, Result};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub chart: Option<Arc<dyn ChartRenderer>>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForecastForm {
    pub product_id: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub user: String,
    pub summary: Summary,
    pub method: ForecastMethod,
    pub forecast: Vec<ForecastPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_svg_base64: Option<String>,
}

impl ForecastError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFoundError { .. } => StatusCode::NOT_FOUND,
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::AuthenticationError | Self::UnauthorizedError => StatusCode::UNAUTHORIZED,
            Self::DuplicateUserError { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                "Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        }
        let body = serde_json::json!({ "error": self.user_friendly_message() });
        (status, Json(body)).into_response()
    }
}

/// A request carrying a live session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub token: String,
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ForecastError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ForecastError::UnauthorizedError)?;
        let username = state
            .sessions
            .resolve(&token)
            .await
            .ok_or(ForecastError::UnauthorizedError)?;
        Ok(Self { username, token })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/forecast", post(forecast))
        .route("/download_csv", post(download_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("📡 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "store_id": state.service.store_id(),
        "records": state.service.dataset().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn signup(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse> {
    state
        .credentials
        .register(&form.username, &form.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Signup successful! Please log in.",
            "username": form.username.trim(),
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse> {
    let username = form.username.trim();
    if !state.credentials.verify(username, &form.password).await? {
        tracing::info!("Rejected login for {}", username);
        return Err(ForecastError::AuthenticationError);
    }

    let token = state.sessions.create(username).await;
    tracing::info!("User {} logged in", username);

    let cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax",
        SESSION_COOKIE, token
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            username: username.to_string(),
            token,
        }),
    ))
}

async fn logout(State(state): State<AppState>, user: AuthenticatedUser) -> StatusCode {
    state.sessions.revoke(&user.token).await;
    tracing::info!("User {} logged out", user.username);
    StatusCode::NO_CONTENT
}

async fn forecast(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Form(form): Form<ForecastForm>,
) -> Result<Json<ForecastResponse>> {
    let request = state
        .service
        .limits()
        .parse(form.product_id.as_deref(), form.days.as_deref())?;
    let outcome = state.service.run(&request)?;

    // 圖表失敗不影響預測結果
    let chart_svg_base64 = state.chart.as_ref().and_then(|renderer| {
        match renderer.render(&outcome.subseries, &outcome.forecast) {
            Ok(bytes) => Some(STANDARD.encode(bytes)),
            Err(e) => {
                tracing::warn!("Chart rendering failed: {}", e);
                None
            }
        }
    });

    Ok(Json(ForecastResponse {
        user: user.username,
        summary: outcome.summary,
        method: outcome.forecast.method,
        forecast: outcome.forecast.points,
        chart_svg_base64,
    }))
}

async fn download_csv(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Form(form): Form<ForecastForm>,
) -> Response {
    let export = state
        .service
        .limits()
        .parse(form.product_id.as_deref(), form.days.as_deref())
        .and_then(|request| state.service.export_csv(&request));

    match export {
        Ok(export) => (
            [
                (header::CONTENT_TYPE, export::CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.filename),
                ),
            ],
            export.bytes,
        )
            .into_response(),
        Err(ForecastError::NotFoundError { .. }) => (
            StatusCode::NOT_FOUND,
            "No data found for that Store/Product",
        )
            .into_response(),
        Err(e @ ForecastError::ValidationError { .. }) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("CSV export failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error generating CSV: {}", e),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok42; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok42"));
    }

    #[test]
    fn test_session_token_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ForecastError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ForecastError::UnauthorizedError.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ForecastError::config("broken").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
