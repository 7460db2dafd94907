//! Client for cloud-hosted QoP simulators
//!
//! This crate provisions and manages remote simulator instances of the
//! Quantum Orchestration Platform (QoP) on the cloud platform. It
//! authenticates a user, requests simulator instances for a chosen platform
//! version (optionally with a hardware cluster topology), tracks each
//! instance's lease, and releases instances when done.
//!
//! # Authentication
//!
//! [`QopCloud::connect`] exchanges an email/password pair for a session JWT
//! at construction time; every later call rides on that session. There is no
//! logout — drop the client and connect again to re-authenticate.
//!
//! # Example
//!
//! ```ignore
//! use qop_cloud::{ClusterConfig, QopCloud, QopVersion};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = QopCloud::connect("user@example.com", "password").await?;
//!
//!     // QoP v3 accepts a hardware topology: one controller, slots 1-8.
//!     let mut config = ClusterConfig::new();
//!     config.controller()?.lf_fems([1, 2])?.mw_fems([3, 7])?;
//!
//!     let mut sim = client.simulator(QopVersion::LATEST, Some(config))?;
//!     sim.spawn().await?;
//!     println!(
//!         "simulator {} at {}:{}, lease until {}",
//!         sim.id().unwrap_or_default(),
//!         sim.host().unwrap_or_default(),
//!         sim.port().unwrap_or_default(),
//!         sim.expires_at().map(|t| t.to_rfc3339()).unwrap_or_default(),
//!     );
//!     sim.close().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! For guaranteed release on all exit paths, use the scoped form
//! [`SimulatorInstance::run`], which closes the instance when the callback
//! returns (unless auto-cleanup was disabled on the client).
//!
//! # Concurrency
//!
//! Every operation is one blocking request/response round trip; the crate
//! spawns no background tasks and performs no retries. Instances created
//! from one client share its session credential — whether concurrent calls
//! on one credential are safe is up to the platform, this crate adds no
//! locking of its own.

pub mod api;
pub mod client;
pub mod cluster;
pub mod error;
pub mod instance;
pub mod version;

pub use api::{ApiClient, InstanceHandle, SimulatorApi};
pub use client::{DEFAULT_HOST, DEFAULT_PORT, QopCloud};
pub use cluster::{ClusterConfig, ControllerConfig, FEM_MAX_SLOT, FEM_MIN_SLOT, FemType};
pub use error::{QopError, QopResult};
pub use instance::{
    ManagerParams, SIMULATION_AUTH_HEADER, SIMULATION_ID_HEADER, SimulatorInstance,
};
pub use version::QopVersion;
