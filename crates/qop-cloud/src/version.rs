//! Published QoP platform versions.

use std::fmt;

use serde::Serialize;

use crate::error::QopError;

/// A published version of the Quantum Orchestration Platform.
///
/// Each variant maps to a fixed `(major, minor, patch)` ordinal resolved at
/// compile time; the ordinal gates feature availability (cluster topologies
/// require major version 3) and selects the server-side simulator build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QopVersion {
    #[serde(rename = "v2_1_3")]
    V2_1_3,
    #[serde(rename = "v2_2_0")]
    V2_2_0,
    #[serde(rename = "v2_2_2")]
    V2_2_2,
    #[serde(rename = "v2_4_0")]
    V2_4_0,
    #[serde(rename = "v3_1_0")]
    V3_1_0,
    #[serde(rename = "v3_2_0")]
    V3_2_0,
}

impl QopVersion {
    /// The most recent platform version.
    pub const LATEST: QopVersion = QopVersion::V3_2_0;

    /// Wire identifier sent to the platform (e.g. `"v3_2_0"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            QopVersion::V2_1_3 => "v2_1_3",
            QopVersion::V2_2_0 => "v2_2_0",
            QopVersion::V2_2_2 => "v2_2_2",
            QopVersion::V2_4_0 => "v2_4_0",
            QopVersion::V3_1_0 => "v3_1_0",
            QopVersion::V3_2_0 => "v3_2_0",
        }
    }

    /// Static `(major, minor, patch)` ordinal for this version.
    const fn ordinal(self) -> (u32, u32, u32) {
        match self {
            QopVersion::V2_1_3 => (2, 1, 3),
            QopVersion::V2_2_0 => (2, 2, 0),
            QopVersion::V2_2_2 => (2, 2, 2),
            QopVersion::V2_4_0 => (2, 4, 0),
            QopVersion::V3_1_0 => (3, 1, 0),
            QopVersion::V3_2_0 => (3, 2, 0),
        }
    }

    /// Major version component.
    pub const fn major(self) -> u32 {
        self.ordinal().0
    }

    /// Minor version component.
    pub const fn minor(self) -> u32 {
        self.ordinal().1
    }

    /// Patch version component.
    pub const fn patch(self) -> u32 {
        self.ordinal().2
    }

    /// Whether this version accepts a cluster topology at launch.
    ///
    /// Cluster configurations are a v3-only feature.
    pub const fn supports_cluster_config(self) -> bool {
        self.major() == 3
    }
}

impl fmt::Display for QopVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QopVersion {
    type Err = QopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v2_1_3" => Ok(QopVersion::V2_1_3),
            "v2_2_0" => Ok(QopVersion::V2_2_0),
            "v2_2_2" => Ok(QopVersion::V2_2_2),
            "v2_4_0" => Ok(QopVersion::V2_4_0),
            "v3_1_0" => Ok(QopVersion::V3_1_0),
            "v3_2_0" => Ok(QopVersion::V3_2_0),
            "latest" => Ok(QopVersion::LATEST),
            other => Err(QopError::Validation(format!(
                "unknown QoP version '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_is_newest() {
        assert_eq!(QopVersion::LATEST, QopVersion::V3_2_0);
        assert_eq!(QopVersion::LATEST.major(), 3);
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(QopVersion::V2_1_3.major(), 2);
        assert_eq!(QopVersion::V2_1_3.minor(), 1);
        assert_eq!(QopVersion::V2_1_3.patch(), 3);
        assert_eq!(QopVersion::V3_1_0.major(), 3);
        assert_eq!(QopVersion::V3_1_0.minor(), 1);
        assert_eq!(QopVersion::V3_1_0.patch(), 0);
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(QopVersion::V2_4_0.as_str(), "v2_4_0");
        assert_eq!(QopVersion::V3_2_0.to_string(), "v3_2_0");
    }

    #[test]
    fn test_cluster_config_gate() {
        assert!(QopVersion::V3_1_0.supports_cluster_config());
        assert!(QopVersion::V3_2_0.supports_cluster_config());
        assert!(!QopVersion::V2_4_0.supports_cluster_config());
        assert!(!QopVersion::V2_1_3.supports_cluster_config());
    }

    #[test]
    fn test_serializes_to_wire_string() {
        let json = serde_json::to_string(&QopVersion::V3_2_0).unwrap();
        assert_eq!(json, r#""v3_2_0""#);
    }

    #[test]
    fn test_from_str_roundtrip() {
        for v in [
            QopVersion::V2_1_3,
            QopVersion::V2_2_0,
            QopVersion::V2_2_2,
            QopVersion::V2_4_0,
            QopVersion::V3_1_0,
            QopVersion::V3_2_0,
        ] {
            assert_eq!(v.as_str().parse::<QopVersion>().unwrap(), v);
        }
        assert_eq!("latest".parse::<QopVersion>().unwrap(), QopVersion::LATEST);
        assert!("v9_9_9".parse::<QopVersion>().is_err());
    }
}
