//! REST API client for the QoP cloud control plane.
//!
//! Implements the platform's v2 API (`{protocol}://{host}:{port}/api/v2`):
//! session login plus the simulator-collection lifecycle endpoints. Every
//! operation is a single synchronous request/response round trip; nothing is
//! retried or queued, failures surface immediately to the caller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::cluster::ClusterConfig;
use crate::error::{QopError, QopResult};
use crate::version::QopVersion;

/// Placeholder used when an error response carries no `message` field.
const NO_MESSAGE: &str = "no message provided";

/// The authenticated simulator-lifecycle operations of the control plane.
///
/// [`ApiClient`] is the production implementation; the seam exists so
/// lifecycle code can be exercised against in-process fakes, the same way
/// backends sit behind a trait elsewhere in the stack.
#[async_trait]
pub trait SimulatorApi: Send + Sync {
    /// Provision a simulator for the given version and optional topology.
    async fn launch_simulator(
        &self,
        version: QopVersion,
        cluster_config: Option<&ClusterConfig>,
    ) -> QopResult<InstanceHandle>;

    /// Delete one simulator instance.
    async fn close_simulator(&self, instance_id: &str) -> QopResult<()>;

    /// Delete every simulator instance owned by this credential.
    async fn close_all_simulators(&self) -> QopResult<()>;
}

/// Session-authenticated REST client for the QoP cloud API.
///
/// Constructed unauthenticated; [`login`](ApiClient::login) exchanges the
/// email/password pair for a JWT which every subsequent call attaches as a
/// raw `Authorization` header (no Bearer prefix). The state machine is
/// one-way: there is no logout, re-authentication means a new client.
pub struct ApiClient {
    /// HTTP client with timeouts configured.
    client: Client,
    /// API base URL including the `/api/v2` prefix.
    base_url: String,
    /// Endpoint host, exposed read-only.
    host: String,
    /// Endpoint port, exposed read-only.
    port: u16,
    /// Email address for authentication.
    email: String,
    /// Password for authentication.
    password: String,
    /// Session JWT; `None` means not yet authenticated.
    jwt: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("jwt", &"[REDACTED]")
            .finish()
    }
}

impl ApiClient {
    /// Create an unauthenticated client for the given endpoint.
    pub fn new(
        protocol: &str,
        host: impl Into<String>,
        port: u16,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> QopResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(QopError::Http)?;

        let host = host.into();
        let base_url = format!("{protocol}://{host}:{port}/api/v2");

        Ok(Self {
            client,
            base_url,
            host,
            port,
            email: email.into(),
            password: password.into(),
            jwt: None,
        })
    }

    /// Endpoint host of the cloud platform API.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Endpoint port of the cloud platform API.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether a login has succeeded on this client.
    pub fn is_authenticated(&self) -> bool {
        self.jwt.is_some()
    }

    fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base_url)
    }

    fn simulators_url(&self, instance_id: Option<&str>) -> String {
        match instance_id {
            Some(id) => format!("{}/simulators/{id}", self.base_url),
            None => format!("{}/simulators", self.base_url),
        }
    }

    fn auth_token(&self) -> QopResult<&str> {
        self.jwt.as_deref().ok_or(QopError::Unauthenticated)
    }

    /// Exchange the stored credentials for a session JWT.
    ///
    /// On any non-201 status the server's `message` is surfaced (and logged
    /// at error severity) and no credential is stored.
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> QopResult<()> {
        let url = self.sessions_url();
        debug!("POST {url}");

        let body = LoginRequest {
            email: &self.email,
            password: &self.password,
        };
        let resp = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let message = error_message(resp).await;
            error!(
                "Authentication for {} failed: HTTP {} {message}",
                self.email,
                status.as_u16()
            );
            return Err(QopError::AuthenticationFailed(message));
        }

        let data: LoginResponse = resp.json().await?;
        self.jwt = Some(data.jwt);
        debug!("login successful for {}", self.email);
        Ok(())
    }

    /// Provision a simulator instance; returns the handle fields on 201.
    #[instrument(skip(self, cluster_config))]
    pub async fn launch_simulator(
        &self,
        version: QopVersion,
        cluster_config: Option<&ClusterConfig>,
    ) -> QopResult<InstanceHandle> {
        let token = self.auth_token()?;
        let url = self.simulators_url(None);
        debug!("POST {url}");

        let body = LaunchRequest {
            version,
            cluster_config,
        };
        let resp = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let message = error_message(resp).await;
            error!("HTTP {}: {message}", status.as_u16());
            return Err(QopError::Provisioning {
                status: status.as_u16(),
                message: format!("could not spawn simulator of version {version}: {message}"),
            });
        }

        Ok(resp.json().await?)
    }

    /// Delete one simulator instance; 200 is the only success status.
    #[instrument(skip(self))]
    pub async fn close_simulator(&self, instance_id: &str) -> QopResult<()> {
        let token = self.auth_token()?;
        let url = self.simulators_url(Some(instance_id));
        debug!("DELETE {url}");

        let resp = self
            .client
            .delete(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, token)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let message = error_message(resp).await;
            error!("HTTP {}: {message}", status.as_u16());
            return Err(QopError::Provisioning {
                status: status.as_u16(),
                message: format!("closing simulator instance {instance_id} failed: {message}"),
            });
        }
        Ok(())
    }

    /// Delete every simulator instance owned by this credential.
    #[instrument(skip(self))]
    pub async fn close_all_simulators(&self) -> QopResult<()> {
        let token = self.auth_token()?;
        let url = self.simulators_url(None);
        debug!("DELETE {url}");

        let resp = self
            .client
            .delete(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, token)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let message = error_message(resp).await;
            error!("HTTP {}: {message}", status.as_u16());
            return Err(QopError::Provisioning {
                status: status.as_u16(),
                message: format!("closing all simulator instances failed: {message}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SimulatorApi for ApiClient {
    async fn launch_simulator(
        &self,
        version: QopVersion,
        cluster_config: Option<&ClusterConfig>,
    ) -> QopResult<InstanceHandle> {
        ApiClient::launch_simulator(self, version, cluster_config).await
    }

    async fn close_simulator(&self, instance_id: &str) -> QopResult<()> {
        ApiClient::close_simulator(self, instance_id).await
    }

    async fn close_all_simulators(&self) -> QopResult<()> {
        ApiClient::close_all_simulators(self).await
    }
}

/// Extract the `message` field from an error response body, falling back to
/// a placeholder when the body is absent or not JSON.
async fn error_message(resp: reqwest::Response) -> String {
    match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or(NO_MESSAGE)
            .to_string(),
        Err(_) => NO_MESSAGE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Request / response serde types
// ---------------------------------------------------------------------------

/// Request body for `POST /sessions`.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response from `POST /sessions`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    /// Session JWT attached to all subsequent requests.
    jwt: String,
}

/// Request body for `POST /simulators`.
///
/// `cluster_config` serializes as `null` when no topology was requested.
#[derive(Debug, Serialize)]
struct LaunchRequest<'a> {
    version: QopVersion,
    cluster_config: Option<&'a ClusterConfig>,
}

/// Handle fields of a provisioned simulator, from `POST /simulators` (201).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceHandle {
    /// Instance identifier used for deletion.
    pub id: String,
    /// Per-instance access token for the simulator itself.
    pub token: String,
    /// Host the simulator listens on.
    pub host: String,
    /// Port the simulator listens on.
    pub port: u16,
    /// Lease expiry; the instance is reclaimed server-side after this time.
    #[serde(deserialize_with = "deserialize_expires_at")]
    pub expires_at: DateTime<Utc>,
}

/// Parse an ISO-8601 expiry timestamp, treating naive timestamps as UTC.
///
/// The platform sends naive timestamps (`2024-06-01T12:00:00`); offsets are
/// accepted too and normalized to UTC.
fn parse_expires_at(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| s.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
}

fn deserialize_expires_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_expires_at(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn client() -> ApiClient {
        ApiClient::new("https", "example.test", 443, "user@example.com", "secret").unwrap()
    }

    #[test]
    fn test_url_building() {
        let api = client();
        assert_eq!(api.sessions_url(), "https://example.test:443/api/v2/sessions");
        assert_eq!(
            api.simulators_url(None),
            "https://example.test:443/api/v2/simulators"
        );
        assert_eq!(
            api.simulators_url(Some("abc-123")),
            "https://example.test:443/api/v2/simulators/abc-123"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let repr = format!("{:?}", client());
        assert!(!repr.contains("secret"));
        assert!(repr.contains("[REDACTED]"));
    }

    #[test]
    fn test_launch_request_without_topology() {
        let req = LaunchRequest {
            version: QopVersion::V2_4_0,
            cluster_config: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "version": "v2_4_0", "cluster_config": null })
        );
    }

    #[test]
    fn test_launch_request_with_topology() {
        let mut config = ClusterConfig::new();
        config.controller().unwrap().lf_fems([3]).unwrap();
        let req = LaunchRequest {
            version: QopVersion::V3_2_0,
            cluster_config: Some(&config),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["version"], "v3_2_0");
        assert_eq!(
            json["cluster_config"]["controllers"]["con1"]["slots"]["3"],
            "LF_FEM"
        );
    }

    #[test]
    fn test_instance_handle_naive_expiry_is_utc() {
        let handle: InstanceHandle = serde_json::from_value(serde_json::json!({
            "id": "sim-1",
            "token": "tok",
            "host": "sim.example.test",
            "port": 9510,
            "expires_at": "2024-06-01T12:30:00"
        }))
        .unwrap();
        assert_eq!(
            handle.expires_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_instance_handle_offset_expiry_normalized() {
        let handle: InstanceHandle = serde_json::from_value(serde_json::json!({
            "id": "sim-1",
            "token": "tok",
            "host": "sim.example.test",
            "port": 9510,
            "expires_at": "2024-06-01T14:30:00+02:00"
        }))
        .unwrap();
        assert_eq!(
            handle.expires_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_calls_rejected() {
        let api = client();
        assert!(!api.is_authenticated());

        let err = api
            .launch_simulator(QopVersion::LATEST, None)
            .await
            .unwrap_err();
        assert!(matches!(err, QopError::Unauthenticated));

        let err = api.close_simulator("sim-1").await.unwrap_err();
        assert!(matches!(err, QopError::Unauthenticated));

        let err = api.close_all_simulators().await.unwrap_err();
        assert!(matches!(err, QopError::Unauthenticated));
    }
}
