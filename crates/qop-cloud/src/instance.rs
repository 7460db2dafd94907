//! Simulator instance lifecycle management.
//!
//! A [`SimulatorInstance`] wraps one provisioning request as a stateful
//! resource: spawn once, use the handle, close when done. The spawn/close
//! guards make both operations idempotent; everything else is read-only
//! access to the last known lease.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::api::{InstanceHandle, SimulatorApi};
use crate::cluster::ClusterConfig;
use crate::error::{QopError, QopResult};
use crate::version::QopVersion;

/// Header carrying the instance id when connecting to the simulator itself.
pub const SIMULATION_ID_HEADER: &str = "simulation-id";

/// Header carrying the instance token when connecting to the simulator.
pub const SIMULATION_AUTH_HEADER: &str = "simulation-auth";

/// A simulator instance on the cloud platform.
///
/// Starts unspawned; [`spawn`](Self::spawn) provisions the remote instance
/// and stores its handle, [`close`](Self::close) releases it and clears the
/// handle. Many instances may share one API client through the [`Arc`]; a
/// single instance takes `&mut self` for spawn/close, so concurrent use of
/// one instance must be serialized by the caller. Concurrent calls across
/// different instances sharing a credential are the transport's concern.
pub struct SimulatorInstance {
    /// Shared authenticated API client.
    api: Arc<dyn SimulatorApi>,
    /// Platform version to provision.
    version: QopVersion,
    /// Optional hardware topology (v3 only, validated by the facade).
    cluster_config: Option<ClusterConfig>,
    /// Whether scoped use closes the instance on exit.
    auto_cleanup: bool,
    /// Remote handle; `None` until spawned and again after close.
    handle: Option<InstanceHandle>,
}

impl std::fmt::Debug for SimulatorInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatorInstance")
            .field("version", &self.version)
            .field("auto_cleanup", &self.auto_cleanup)
            .field("spawned", &self.handle.is_some())
            .finish()
    }
}

impl SimulatorInstance {
    /// Create an unspawned instance bound to a shared API client.
    pub fn new(
        api: Arc<dyn SimulatorApi>,
        version: QopVersion,
        cluster_config: Option<ClusterConfig>,
        auto_cleanup: bool,
    ) -> Self {
        Self {
            api,
            version,
            cluster_config,
            auto_cleanup,
            handle: None,
        }
    }

    /// Provision the simulator on the cloud platform.
    ///
    /// The simulator is spawned only once: further calls are no-ops until an
    /// intervening [`close`](Self::close).
    pub async fn spawn(&mut self) -> QopResult<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        debug!("creating simulator with version {}", self.version);
        let handle = self
            .api
            .launch_simulator(self.version, self.cluster_config.as_ref())
            .await?;
        info!(
            "simulator created with id {} at {}:{}",
            handle.id, handle.host, handle.port
        );
        self.handle = Some(handle);
        Ok(())
    }

    /// Release the remote simulator and clear the handle.
    ///
    /// Idempotent: closing an unspawned or already-closed instance is a
    /// no-op. The handle is only cleared once the platform confirmed the
    /// deletion, so a failed close leaves the instance spawned.
    pub async fn close(&mut self) -> QopResult<()> {
        let Some(id) = self.handle.as_ref().map(|h| h.id.clone()) else {
            debug!("simulator was not spawned, nothing to close");
            return Ok(());
        };

        debug!("closing simulator with id {id}");
        self.api.close_simulator(&id).await?;
        info!("simulator closed successfully");
        self.handle = None;
        Ok(())
    }

    /// Scoped acquisition: spawn, run the callback with a copy of the
    /// handle, then close on every exit path unless `auto_cleanup` was
    /// disabled at construction.
    ///
    /// A callback error takes precedence over a close error; the latter is
    /// then only logged. With `auto_cleanup` disabled the remote instance
    /// keeps running until it expires or is closed explicitly.
    pub async fn run<T, F, Fut>(&mut self, f: F) -> QopResult<T>
    where
        F: FnOnce(InstanceHandle) -> Fut,
        Fut: Future<Output = QopResult<T>>,
    {
        self.spawn().await?;
        let Some(handle) = self.handle.clone() else {
            // spawn() stores the handle before returning Ok.
            return Err(QopError::Validation("simulator is not spawned".into()));
        };

        let outcome = f(handle).await;

        if !self.auto_cleanup {
            debug!("skipping close as auto_cleanup is disabled");
            return outcome;
        }
        match self.close().await {
            Ok(()) => outcome,
            Err(close_err) => match outcome {
                Ok(_) => Err(close_err),
                Err(use_err) => {
                    error!("closing simulator after scoped use failed: {close_err}");
                    Err(use_err)
                }
            },
        }
    }

    /// Whether the instance is currently spawned.
    pub fn is_spawned(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether the last known lease is still in the future.
    ///
    /// Local computation against the stored expiry, not a server round trip:
    /// false before spawn and once the lease has run out.
    pub fn is_alive(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|h| Utc::now() < h.expires_at)
    }

    /// Instance identifier, `None` before spawn.
    pub fn id(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.id.as_str())
    }

    /// Per-instance access token, `None` before spawn.
    pub fn token(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.token.as_str())
    }

    /// Simulator host, `None` before spawn.
    pub fn host(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.host.as_str())
    }

    /// Simulator port, `None` before spawn.
    pub fn port(&self) -> Option<u16> {
        self.handle.as_ref().map(|h| h.port)
    }

    /// Lease expiry (UTC), `None` before spawn.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.handle.as_ref().map(|h| h.expires_at)
    }

    /// The requested platform version.
    pub fn version(&self) -> QopVersion {
        self.version
    }

    /// The requested hardware topology, if any.
    pub fn cluster_config(&self) -> Option<&ClusterConfig> {
        self.cluster_config.as_ref()
    }

    /// Header pairs for connecting to the spawned simulator, `None` before
    /// spawn.
    pub fn connection_headers(&self) -> Option<[(&'static str, String); 2]> {
        self.handle.as_ref().map(|h| {
            [
                (SIMULATION_ID_HEADER, h.id.clone()),
                (SIMULATION_AUTH_HEADER, h.token.clone()),
            ]
        })
    }

    /// Legacy connection-parameter bundle.
    ///
    /// Unlike the plain accessors this fails when the instance is not
    /// spawned.
    #[deprecated(note = "use the `host`/`port`/`id`/`token` accessors instead")]
    pub fn manager_params(&self) -> QopResult<ManagerParams> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| QopError::Validation("simulator is not spawned".into()))?;
        Ok(ManagerParams {
            host: handle.host.clone(),
            port: handle.port,
            sim_id: handle.id.clone(),
            sim_token: handle.token.clone(),
        })
    }

    /// Legacy alias for [`id`](Self::id).
    #[deprecated(note = "use `id` instead")]
    pub fn sim_id(&self) -> Option<&str> {
        self.id()
    }

    /// Legacy alias for [`token`](Self::token).
    #[deprecated(note = "use `token` instead")]
    pub fn sim_token(&self) -> Option<&str> {
        self.token()
    }

    /// Legacy alias for [`host`](Self::host).
    #[deprecated(note = "use `host` instead")]
    pub fn sim_host(&self) -> Option<&str> {
        self.host()
    }

    /// Legacy alias for [`port`](Self::port).
    #[deprecated(note = "use `port` instead")]
    pub fn sim_port(&self) -> Option<u16> {
        self.port()
    }
}

/// Legacy connection-parameter bundle for the simulator manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerParams {
    pub host: String,
    pub port: u16,
    pub sim_id: String,
    pub sim_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Api stub that refuses every call; unspawned-state tests never reach it.
    struct UnreachableApi;

    #[async_trait]
    impl SimulatorApi for UnreachableApi {
        async fn launch_simulator(
            &self,
            _version: QopVersion,
            _cluster_config: Option<&ClusterConfig>,
        ) -> QopResult<InstanceHandle> {
            panic!("launch_simulator must not be called");
        }

        async fn close_simulator(&self, _instance_id: &str) -> QopResult<()> {
            panic!("close_simulator must not be called");
        }

        async fn close_all_simulators(&self) -> QopResult<()> {
            panic!("close_all_simulators must not be called");
        }
    }

    fn unspawned() -> SimulatorInstance {
        SimulatorInstance::new(Arc::new(UnreachableApi), QopVersion::LATEST, None, true)
    }

    #[test]
    fn test_accessors_before_spawn_return_none() {
        let instance = unspawned();
        assert!(!instance.is_spawned());
        assert!(!instance.is_alive());
        assert_eq!(instance.id(), None);
        assert_eq!(instance.token(), None);
        assert_eq!(instance.host(), None);
        assert_eq!(instance.port(), None);
        assert_eq!(instance.expires_at(), None);
        assert!(instance.connection_headers().is_none());
    }

    #[test]
    fn test_manager_params_before_spawn_fails() {
        let instance = unspawned();
        #[allow(deprecated)]
        let err = instance.manager_params().unwrap_err();
        assert!(matches!(err, QopError::Validation(_)));
    }

    #[tokio::test]
    async fn test_close_before_spawn_is_noop() {
        // UnreachableApi panics on any call; close must not issue one.
        let mut instance = unspawned();
        instance.close().await.unwrap();
        instance.close().await.unwrap();
    }
}
