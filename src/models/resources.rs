use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::merge::{pick_optional, Overlay};

/// Container resource limits. Quantities are passed through untouched ("500m", "512Mi").
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_count: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestsResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl Overlay<LimitsResources> for LimitsResources {
    fn overlay(&self, base: &LimitsResources) -> LimitsResources {
        LimitsResources {
            cpu: pick_optional(&self.cpu, &base.cpu),
            memory: pick_optional(&self.memory, &base.memory),
            gpu_vendor: pick_optional(&self.gpu_vendor, &base.gpu_vendor),
            gpu_count: pick_optional(&self.gpu_count, &base.gpu_count),
        }
    }
}

impl Overlay<RequestsResources> for RequestsResources {
    fn overlay(&self, base: &RequestsResources) -> RequestsResources {
        RequestsResources {
            cpu: pick_optional(&self.cpu, &base.cpu),
            memory: pick_optional(&self.memory, &base.memory),
        }
    }
}
