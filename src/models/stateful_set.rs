use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::merge::{pick, pick_optional, Overlay};

pub const DEFAULT_VOLUME_CLAIM_STORAGE: &str = "10m";

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StatefulSet {
    pub volume_claim_template: VolumeClaimTemplate,
}

/// Persistent volume claim created for every stateful set replica.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeClaimTemplate {
    pub storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

impl Default for VolumeClaimTemplate {
    fn default() -> Self {
        VolumeClaimTemplate {
            storage: DEFAULT_VOLUME_CLAIM_STORAGE.to_string(),
            storage_class_name: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StatefulSetOverrides {
    pub volume_claim_template: VolumeClaimTemplateOverrides,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeClaimTemplateOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

impl Overlay<StatefulSet> for StatefulSetOverrides {
    fn overlay(&self, base: &StatefulSet) -> StatefulSet {
        StatefulSet {
            volume_claim_template: self
                .volume_claim_template
                .overlay(&base.volume_claim_template),
        }
    }
}

impl Overlay<VolumeClaimTemplate> for VolumeClaimTemplateOverrides {
    fn overlay(&self, base: &VolumeClaimTemplate) -> VolumeClaimTemplate {
        VolumeClaimTemplate {
            storage: pick(&self.storage, &base.storage),
            storage_class_name: pick_optional(&self.storage_class_name, &base.storage_class_name),
        }
    }
}
