use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::merge::{pick_list, pick_optional, Overlay};

/// A fully custom init container. Unrelated to the image-only override used for the
/// stateful set init container.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct InitContainer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl Overlay<InitContainer> for InitContainer {
    fn overlay(&self, base: &InitContainer) -> InitContainer {
        InitContainer {
            image_name: pick_optional(&self.image_name, &base.image_name),
            container_name: pick_optional(&self.container_name, &base.container_name),
            commands: pick_list(&self.commands, &base.commands),
        }
    }
}
