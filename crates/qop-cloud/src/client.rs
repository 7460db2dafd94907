//! Top-level client facade for the QoP cloud platform.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::ApiClient;
use crate::cluster::ClusterConfig;
use crate::error::{QopError, QopResult};
use crate::instance::SimulatorInstance;
use crate::version::QopVersion;

/// Default endpoint host of the cloud platform API.
pub const DEFAULT_HOST: &str = "qm-saas.quantum-machines.co";

/// Default endpoint port of the cloud platform API.
pub const DEFAULT_PORT: u16 = 443;

const DEFAULT_PROTOCOL: &str = "https";

/// Authenticated client for the QoP cloud platform.
///
/// Logs in at construction — a [`QopCloud`] value always holds a valid
/// session — and hands out unspawned [`SimulatorInstance`]s bound to its
/// session.
///
/// # Example
///
/// ```ignore
/// use qop_cloud::{QopCloud, QopVersion, ClusterConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = QopCloud::connect("user@example.com", "password").await?;
///
///     let mut config = ClusterConfig::new();
///     config.controller()?.lf_fems([1, 2])?.mw_fems([3])?;
///
///     let mut sim = client.simulator(QopVersion::LATEST, Some(config))?;
///     sim.run(|handle| async move {
///         println!("simulator at {}:{}", handle.host, handle.port);
///         Ok(())
///     })
///     .await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct QopCloud {
    /// Shared session-authenticated API client.
    api: Arc<ApiClient>,
    /// Default auto-cleanup policy for instances created by this client.
    auto_cleanup: bool,
}

impl QopCloud {
    /// Connect to the default production endpoint and log in.
    ///
    /// Construction fails if authentication fails; no unauthenticated client
    /// is ever handed out.
    pub async fn connect(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> QopResult<Self> {
        Self::connect_to(DEFAULT_HOST, DEFAULT_PORT, email, password).await
    }

    /// Connect to a custom endpoint (useful for testing) and log in.
    #[instrument(skip(email, password))]
    pub async fn connect_to(
        host: impl Into<String> + std::fmt::Debug,
        port: u16,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> QopResult<Self> {
        let mut api = ApiClient::new(DEFAULT_PROTOCOL, host, port, email, password)?;
        api.login().await?;
        debug!("connected to {}:{}", api.host(), api.port());

        Ok(Self {
            api: Arc::new(api),
            auto_cleanup: true,
        })
    }

    /// Set the auto-cleanup policy for instances created afterwards.
    ///
    /// With auto-cleanup disabled, scoped use leaves the remote instance
    /// running until it expires or is closed explicitly. Defaults to `true`.
    pub fn with_auto_cleanup(mut self, auto_cleanup: bool) -> Self {
        self.auto_cleanup = auto_cleanup;
        self
    }

    /// Create a fresh, unspawned simulator instance for the given version.
    ///
    /// Cluster topologies are a v3-only feature: supplying one with a
    /// version whose major component is not 3 fails with a validation error.
    pub fn simulator(
        &self,
        version: QopVersion,
        cluster_config: Option<ClusterConfig>,
    ) -> QopResult<SimulatorInstance> {
        if cluster_config.is_some() && !version.supports_cluster_config() {
            return Err(QopError::Validation(
                "cluster configuration is only supported for QoP v3.x.x".into(),
            ));
        }

        Ok(SimulatorInstance::new(
            self.api.clone(),
            version,
            cluster_config,
            self.auto_cleanup,
        ))
    }

    /// Close every simulator instance owned by this session's credential,
    /// including ones not tracked by any local [`SimulatorInstance`].
    pub async fn close_all(&self) -> QopResult<()> {
        self.api.close_all_simulators().await
    }

    /// Endpoint host of the cloud platform API.
    pub fn host(&self) -> &str {
        self.api.host()
    }

    /// Endpoint port of the cloud platform API.
    pub fn port(&self) -> u16 {
        self.api.port()
    }
}
