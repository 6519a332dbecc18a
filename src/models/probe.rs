use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::merge::{pick, pick_optional, Overlay};

/// Timing and target of a liveness or readiness health check.
///
/// `path` and `port` left unset mean no HTTP probe is configured.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSettings {
    pub delay: i32,
    pub period: i32,
    pub timeout: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

impl ProbeSettings {
    pub fn liveness() -> Self {
        ProbeSettings {
            delay: 10,
            period: 60,
            timeout: 2,
            path: None,
            port: None,
        }
    }

    pub fn readiness() -> Self {
        ProbeSettings {
            delay: 10,
            period: 10,
            timeout: 2,
            path: None,
            port: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

impl Overlay<ProbeSettings> for ProbeOverrides {
    fn overlay(&self, base: &ProbeSettings) -> ProbeSettings {
        ProbeSettings {
            delay: pick(&self.delay, &base.delay),
            period: pick(&self.period, &base.period),
            timeout: pick(&self.timeout, &base.timeout),
            path: pick_optional(&self.path, &base.path),
            port: pick_optional(&self.port, &base.port),
        }
    }
}
