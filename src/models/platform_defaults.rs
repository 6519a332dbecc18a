use k8s_openapi::api::core::v1::{NodeAffinity, PodAffinity, PodAntiAffinity, Volume, VolumeMount};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;

use super::deployment_overrides::DeploymentOverrides;
use super::effective::EffectiveConfiguration;
use super::init_container::InitContainer;
use super::key_ref::{ConfigMapKeyRef, SecretKeyRef};
use super::policy::{EntryPointStyle, ImagePullPolicy};
use super::probe::ProbeSettings;
use super::resources::{LimitsResources, RequestsResources};
use super::security_context::PodSecurityContext;
use super::stateful_set::StatefulSet;
use super::toleration::Toleration;
use crate::utils::merge::Overlay;

/// Environment variable the default namespace is taken from.
pub const ENV_KEY_KUBERNETES_NAMESPACE: &str = "KUBERNETES_NAMESPACE";

pub const DEFAULT_MAXIMUM_CONCURRENT_TASKS: i32 = 20;
pub const DEFAULT_MINUTES_TO_WAIT_FOR_LOAD_BALANCER: i32 = 5;
pub const DEFAULT_MAX_TERMINATED_ERROR_RESTARTS: i32 = 2;
pub const DEFAULT_MAX_CRASH_LOOP_BACK_OFF_RESTARTS: i32 = 4;

/// Settings applied to every deployment launched by this deployer unless the deployment
/// overrides them.
///
/// Loaded once at startup and then only read. Nothing is validated: quantities, annotation
/// strings and node selectors are kept exactly as given and interpreted by whoever builds the
/// workload.
///
/// Deserialization goes through [`DeploymentOverrides`] laid over [`PlatformDefaults::default`],
/// so a document may leave out any field, including single leaves of a nested group.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(from = "DeploymentOverrides", rename_all = "camelCase")]
#[schemars(default)]
pub struct PlatformDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Cap on concurrently running task workloads.
    pub maximum_concurrent_tasks: i32,

    pub liveness_probe: ProbeSettings,
    pub readiness_probe: ProbeSettings,
    /// Secret holding credentials for secured probe endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_credentials_secret: Option<String>,

    pub limits: LimitsResources,
    pub requests: RequestsResources,

    pub tolerations: Vec<Toleration>,
    pub secret_key_refs: Vec<SecretKeyRef>,
    pub config_map_key_refs: Vec<ConfigMapKeyRef>,
    pub config_map_refs: Vec<String>,
    pub secret_refs: Vec<String>,

    pub stateful_set: StatefulSet,

    /// Raw `KEY=VALUE` entries.
    pub environment_variables: Vec<String>,
    pub entry_point_style: EntryPointStyle,

    pub create_load_balancer: bool,
    pub host_network: bool,
    pub create_job: bool,

    // comma separated `key:value` pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_annotations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_annotations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_annotations: Option<String>,

    pub minutes_to_wait_for_load_balancer: i32,
    pub max_terminated_error_restarts: i32,
    pub max_crash_loop_back_off_restarts: i32,

    pub image_pull_policy: ImagePullPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    pub volume_mounts: Vec<VolumeMount>,
    pub volumes: Vec<Volume>,

    /// `key:value[,key:value...]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_service_account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_security_context: Option<PodSecurityContext>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_affinity: Option<NodeAffinity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_affinity: Option<PodAffinity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<PodAntiAffinity>,

    /// Image of the init container placed ahead of a stateful set's main container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateful_set_init_container_image_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_container: Option<InitContainer>,
}

impl Default for PlatformDefaults {
    fn default() -> Self {
        PlatformDefaults {
            namespace: env::var(ENV_KEY_KUBERNETES_NAMESPACE).ok(),
            maximum_concurrent_tasks: DEFAULT_MAXIMUM_CONCURRENT_TASKS,
            liveness_probe: ProbeSettings::liveness(),
            readiness_probe: ProbeSettings::readiness(),
            probe_credentials_secret: None,
            limits: LimitsResources::default(),
            requests: RequestsResources::default(),
            tolerations: Vec::new(),
            secret_key_refs: Vec::new(),
            config_map_key_refs: Vec::new(),
            config_map_refs: Vec::new(),
            secret_refs: Vec::new(),
            stateful_set: StatefulSet::default(),
            environment_variables: Vec::new(),
            entry_point_style: EntryPointStyle::default(),
            create_load_balancer: false,
            host_network: false,
            create_job: false,
            service_annotations: None,
            pod_annotations: None,
            job_annotations: None,
            minutes_to_wait_for_load_balancer: DEFAULT_MINUTES_TO_WAIT_FOR_LOAD_BALANCER,
            max_terminated_error_restarts: DEFAULT_MAX_TERMINATED_ERROR_RESTARTS,
            max_crash_loop_back_off_restarts: DEFAULT_MAX_CRASH_LOOP_BACK_OFF_RESTARTS,
            image_pull_policy: ImagePullPolicy::default(),
            image_pull_secret: None,
            volume_mounts: Vec::new(),
            volumes: Vec::new(),
            node_selector: None,
            deployment_service_account_name: None,
            pod_security_context: None,
            node_affinity: None,
            pod_affinity: None,
            pod_anti_affinity: None,
            stateful_set_init_container_image_name: None,
            init_container: None,
        }
    }
}

impl From<DeploymentOverrides> for PlatformDefaults {
    fn from(overrides: DeploymentOverrides) -> Self {
        overrides.overlay(&PlatformDefaults::default())
    }
}

impl PlatformDefaults {
    /// Effective configuration of a deployment that overrides nothing.
    pub fn effective(&self) -> EffectiveConfiguration {
        EffectiveConfiguration::new(self.clone())
    }
}
