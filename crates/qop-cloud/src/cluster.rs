//! Hardware cluster topology model.
//!
//! A [`ClusterConfig`] describes the controller chassis and front-end modules
//! (FEMs) a simulator instance should emulate. The platform currently accepts
//! a single controller with up to eight numbered slots, each holding one of
//! two module types. All validation happens at build time; serialization of a
//! validly built config never fails.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{QopError, QopResult};

/// Lowest valid FEM slot number.
pub const FEM_MIN_SLOT: u8 = 1;

/// Highest valid FEM slot number.
pub const FEM_MAX_SLOT: u8 = 8;

/// Front-end module (FEM) types available in a controller slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FemType {
    /// Low-frequency front-end module.
    #[serde(rename = "LF_FEM")]
    LfFem,
    /// Microwave front-end module.
    #[serde(rename = "MW_FEM")]
    MwFem,
}

impl FemType {
    /// Wire identifier for this module type.
    pub const fn as_str(self) -> &'static str {
        match self {
            FemType::LfFem => "LF_FEM",
            FemType::MwFem => "MW_FEM",
        }
    }
}

impl fmt::Display for FemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of one controller chassis and its FEMs.
///
/// Slot assignments are validated immediately: slot numbers must lie in
/// `[1, 8]` and a slot may be assigned at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControllerConfig {
    slots: BTreeMap<u8, FemType>,
}

impl ControllerConfig {
    /// Assign LF FEMs to the given slots.
    pub fn lf_fems<I>(&mut self, slots: I) -> QopResult<&mut Self>
    where
        I: IntoIterator<Item = u8>,
    {
        for slot in slots {
            self.add_slot(slot, FemType::LfFem)?;
        }
        Ok(self)
    }

    /// Assign MW FEMs to the given slots.
    pub fn mw_fems<I>(&mut self, slots: I) -> QopResult<&mut Self>
    where
        I: IntoIterator<Item = u8>,
    {
        for slot in slots {
            self.add_slot(slot, FemType::MwFem)?;
        }
        Ok(self)
    }

    fn add_slot(&mut self, slot: u8, fem_type: FemType) -> QopResult<()> {
        if !(FEM_MIN_SLOT..=FEM_MAX_SLOT).contains(&slot) {
            return Err(QopError::Configuration(format!(
                "Invalid slot number {slot}, must be in [{FEM_MIN_SLOT}, {FEM_MAX_SLOT}]"
            )));
        }
        if let Some(existing) = self.slots.get(&slot) {
            return Err(QopError::Configuration(format!(
                "Slot number {slot} is already configured as {existing}"
            )));
        }
        self.slots.insert(slot, fem_type);
        Ok(())
    }

    /// The slot-to-FEM assignments of this controller.
    pub fn slots(&self) -> &BTreeMap<u8, FemType> {
        &self.slots
    }
}

/// Configuration of the cluster and its controllers.
///
/// The platform currently supports exactly one controller, named `con1`.
/// Controller names follow the `con<digits>` pattern; both the naming rule
/// and the one-controller limit live here so a future multi-controller
/// platform revisits them together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterConfig {
    controllers: BTreeMap<String, ControllerConfig>,
}

impl ClusterConfig {
    /// Create an empty cluster configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a controller to the cluster and return it for slot assignment.
    ///
    /// The controller name is synthesized as `con<n>`. Fails if a controller
    /// already exists (platform limit) or the synthesized name does not match
    /// the `con<digits>` pattern.
    pub fn controller(&mut self) -> QopResult<&mut ControllerConfig> {
        if !self.controllers.is_empty() {
            return Err(QopError::Configuration(
                "Only one controller is supported".into(),
            ));
        }
        let name = format!("con{}", self.controllers.len() + 1);
        if !is_valid_controller_name(&name) {
            return Err(QopError::Configuration(format!(
                "Invalid controller name {name}; expecting 'con' followed by digits"
            )));
        }
        Ok(self.controllers.entry(name).or_default())
    }

    /// The controllers of this cluster, keyed by name.
    pub fn controllers(&self) -> &BTreeMap<String, ControllerConfig> {
        &self.controllers
    }

    /// Serialize to the nested wire mapping
    /// `{"controllers": {name: {"slots": {slot: type}}}}`.
    ///
    /// Pure and deterministic; never fails once the config was built validly.
    pub fn to_wire(&self) -> Value {
        let controllers: Map<String, Value> = self
            .controllers
            .iter()
            .map(|(name, con)| {
                let slots: Map<String, Value> = con
                    .slots
                    .iter()
                    .map(|(slot, fem)| (slot.to_string(), Value::String(fem.as_str().into())))
                    .collect();
                (name.clone(), json!({ "slots": slots }))
            })
            .collect();
        json!({ "controllers": controllers })
    }
}

/// Controller names must be `con` followed by at least one digit.
fn is_valid_controller_name(name: &str) -> bool {
    match name.strip_prefix("con") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
