//! API client for the session endpoints and the family API.
//!
//! This module provides the `ApiClient` struct. Authentication is carried by
//! the credential cookie in the client's jar, never by a bearer header.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::cookie::Jar;
use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::CREDENTIAL_COOKIE;
use crate::config::ClientConfig;
use crate::models::{MeResponse, Member, MembersResponse, UserProfile};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const ME_PATH: &str = "/api/auth/me";
const LOGOUT_PATH: &str = "/api/auth/logout";
const MEMBERS_PATH: &str = "/families/me/members";
const JOIN_REQUESTS_PATH: &str = "/families/join-requests";

/// Error message the session endpoint uses for a credential that failed
/// verification (as opposed to a missing one).
const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

// ============================================================================
// Response types
// ============================================================================

/// Outcome of asking the session endpoint who the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhoAmI {
    Authenticated(UserProfile),
    /// No credential was sent
    Unauthenticated,
    /// A credential was sent but did not verify
    Invalid,
}

impl WhoAmI {
    pub fn into_user(self) -> Option<UserProfile> {
        match self {
            WhoAmI::Authenticated(user) => Some(user),
            WhoAmI::Unauthenticated | WhoAmI::Invalid => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct JoinRequest<'a> {
    token: &'a str,
}

// ============================================================================
// Client
// ============================================================================

/// API client for the family-diary services.
/// Clone is cheap and clones share both the connection pool and the cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    jar: Arc<Jar>,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Create a new API client with an empty cookie jar
    pub fn new(config: ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder().cookie_provider(Arc::clone(&jar));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            jar,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Place a credential in the cookie jar for both origins, as the identity
    /// provider's redirect would in a browser.
    pub fn set_credential(&self, token: &str) -> Result<()> {
        let cookie = format!("{}={}; Path=/; HttpOnly", CREDENTIAL_COOKIE, token);
        for base in [&self.config.app_url, &self.config.api_url] {
            let url = Url::parse(base).with_context(|| format!("Invalid base URL: {}", base))?;
            self.jar.add_cookie_str(&cookie, &url);
        }
        Ok(())
    }

    /// Ask the session endpoint who the caller is.
    ///
    /// Both 401 bodies map to a non-error outcome; only transport failures
    /// and unexpected statuses are errors.
    pub async fn whoami(&self) -> Result<WhoAmI> {
        let url = self.config.app_endpoint(ME_PATH);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            let body: MeResponse = response
                .json()
                .await
                .context("Failed to parse session response")?;
            debug!(user_id = %body.user.id, "Session endpoint reports authenticated user");
            return Ok(if body.authenticated {
                WhoAmI::Authenticated(body.user)
            } else {
                WhoAmI::Unauthenticated
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let outcome = match body.error.as_deref() {
                Some(INVALID_TOKEN_MESSAGE) => WhoAmI::Invalid,
                _ => WhoAmI::Unauthenticated,
            };
            debug!(?outcome, "Session endpoint rejected caller");
            return Ok(outcome);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body).into())
    }

    /// Ask the session endpoint to clear the credential cookie.
    pub async fn logout(&self) -> Result<()> {
        let url = self.config.app_endpoint(LOGOUT_PATH);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Fetch the current user's family members, restricted to `fields`
    /// (comma separated, e.g. `id,name`).
    pub async fn fetch_family_members(&self, fields: &str) -> Result<Vec<Member>> {
        let url = self.config.api_endpoint(MEMBERS_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[("fields", fields)])
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = Self::check_response(response).await?;
        let body: MembersResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))?;

        debug!(count = body.data.len(), "Fetched family members");
        Ok(body.data)
    }

    /// Ask to join a family with an invitation token.
    pub async fn submit_join_request(&self, invitation: &str) -> Result<()> {
        let url = self.config.api_endpoint(JOIN_REQUESTS_PATH);

        let response = self
            .client
            .post(&url)
            .json(&JoinRequest { token: invitation })
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty());

        warn!(status = %status, "Family join request rejected");
        match message {
            Some(message) => Err(ApiError::Rejected(message).into()),
            None => Err(ApiError::from_status(status, &text).into()),
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }
}
