//! The reqwest-backed game API client.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, error};

use sweeper_core::{CredentialState, Identity, RoundData, UserProfile};

use crate::error::{ApiError, ApiResult};
use crate::types::{LoginRequest, LossReport, RefreshRequest, TokenPair, WinReport};

/// Production API base.
pub const DEFAULT_BASE_URL: &str = "https://api.bybitcoinsweeper.com/api";

/// Web origin the mini-app is served from.
pub const GAME_ORIGIN: &str = "https://bybitcoinsweeper.com";

/// Header carrying the web-app auth blob on every authenticated call.
const INIT_DATA_HEADER: &str = "Tl-Init-Data";

/// The game API surface the round engine and credential manager drive.
///
/// Implemented by [`GameApiClient`]; tests substitute scripted fakes.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// `POST /auth/refresh-token`. Only HTTP 201 counts as success.
    async fn refresh_token(&self, refresh_token: &str) -> ApiResult<TokenPair>;

    /// `POST /auth/login` with the auth blob and the referral id.
    async fn login(&self, init_data: &str, referred_by: &str) -> ApiResult<TokenPair>;

    /// `GET /users/me`.
    async fn me(&self, creds: &CredentialState) -> ApiResult<UserProfile>;

    /// `POST /games/start` with an empty body.
    async fn start_round(&self, creds: &CredentialState) -> ApiResult<RoundData>;

    /// `POST /games/lose`. Only HTTP 201 counts as success.
    async fn report_loss(&self, creds: &CredentialState, report: &LossReport) -> ApiResult<()>;

    /// `POST /games/win`. Only HTTP 201 counts as success.
    async fn report_win(&self, creds: &CredentialState, report: &WinReport) -> ApiResult<()>;
}

/// HTTP client bound to one identity (user agent, optional proxy).
pub struct GameApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GameApiClient {
    /// Build a client for `identity` against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the user agent or proxy settings
    /// are unusable.
    pub fn new(identity: &Identity) -> ApiResult<Self> {
        Self::with_base_url(identity, DEFAULT_BASE_URL)
    }

    /// Build a client against an explicit base URL (tests point this at a
    /// local stub).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the user agent or proxy settings
    /// are unusable.
    pub fn with_base_url(identity: &Identity, base_url: impl Into<String>) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers())
            .user_agent(identity.user_agent.clone());

        if let Some(proxy) = &identity.proxy {
            let proxy = reqwest::Proxy::all(proxy.to_url())
                .map_err(|e| ApiError::Config(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the per-call auth headers from the credential state.
    fn auth_headers(creds: &CredentialState) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = creds.bearer()
            && let Ok(value) = HeaderValue::try_from(format!("Bearer {token}"))
        {
            headers.insert(header::AUTHORIZATION, value);
        }
        if let Some(blob) = &creds.init_data
            && let Ok(value) = HeaderValue::try_from(blob.as_str())
        {
            headers.insert(INIT_DATA_HEADER, value);
        }
        headers
    }

    /// Map a non-success response to the error taxonomy.
    async fn unexpected(endpoint: &str, response: reqwest::Response) -> ApiError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!(endpoint, "bearer token rejected (401)");
            return ApiError::AuthExpired;
        }
        let body = response.text().await.unwrap_or_default();
        error!(endpoint, status = %status, body = %body, "unexpected API response");
        ApiError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl GameApi for GameApiClient {
    async fn refresh_token(&self, refresh_token: &str) -> ApiResult<TokenPair> {
        let response = self
            .http
            .post(self.url("/auth/refresh-token"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        if response.status() == StatusCode::CREATED {
            Ok(response.json().await?)
        } else {
            Err(Self::unexpected("/auth/refresh-token", response).await)
        }
    }

    async fn login(&self, init_data: &str, referred_by: &str) -> ApiResult<TokenPair> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .header(INIT_DATA_HEADER, init_data)
            .json(&LoginRequest {
                init_data,
                referred_by,
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::unexpected("/auth/login", response).await)
        }
    }

    async fn me(&self, creds: &CredentialState) -> ApiResult<UserProfile> {
        let response = self
            .http
            .get(self.url("/users/me"))
            .headers(Self::auth_headers(creds))
            .send()
            .await?;

        if response.status() == StatusCode::OK {
            Ok(response.json().await?)
        } else {
            Err(Self::unexpected("/users/me", response).await)
        }
    }

    async fn start_round(&self, creds: &CredentialState) -> ApiResult<RoundData> {
        let response = self
            .http
            .post(self.url("/games/start"))
            .headers(Self::auth_headers(creds))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::unexpected("/games/start", response).await)
        }
    }

    async fn report_loss(&self, creds: &CredentialState, report: &LossReport) -> ApiResult<()> {
        let response = self
            .http
            .post(self.url("/games/lose"))
            .headers(Self::auth_headers(creds))
            .json(report)
            .send()
            .await?;

        if response.status() == StatusCode::CREATED {
            Ok(())
        } else {
            Err(Self::unexpected("/games/lose", response).await)
        }
    }

    async fn report_win(&self, creds: &CredentialState, report: &WinReport) -> ApiResult<()> {
        let response = self
            .http
            .post(self.url("/games/win"))
            .headers(Self::auth_headers(creds))
            .json(report)
            .send()
            .await?;

        if response.status() == StatusCode::CREATED {
            Ok(())
        } else {
            Err(Self::unexpected("/games/win", response).await)
        }
    }
}

/// Browser-like defaults sent on every request; the user agent is set
/// per-identity on the client builder.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::ORIGIN, HeaderValue::from_static(GAME_ORIGIN));
    headers.insert(
        header::REFERER,
        HeaderValue::from_static("https://bybitcoinsweeper.com/"),
    );
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("empty"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("cors"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("same-site"));
    headers
}
