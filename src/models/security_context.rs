use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::merge::{pick_optional, Overlay};

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PodSecurityContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fs_group: Option<i64>,
}

impl Overlay<PodSecurityContext> for PodSecurityContext {
    fn overlay(&self, base: &PodSecurityContext) -> PodSecurityContext {
        PodSecurityContext {
            run_as_user: pick_optional(&self.run_as_user, &base.run_as_user),
            fs_group: pick_optional(&self.fs_group, &base.fs_group),
        }
    }
}
