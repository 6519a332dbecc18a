use k8s_openapi::api::core::v1::{NodeAffinity, PodAffinity, PodAntiAffinity, Volume, VolumeMount};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::effective::EffectiveConfiguration;
use super::init_container::InitContainer;
use super::key_ref::{ConfigMapKeyRef, SecretKeyRef};
use super::platform_defaults::PlatformDefaults;
use super::policy::{EntryPointStyle, ImagePullPolicy};
use super::probe::ProbeOverrides;
use super::resources::{LimitsResources, RequestsResources};
use super::security_context::PodSecurityContext;
use super::stateful_set::StatefulSetOverrides;
use super::toleration::Toleration;
use crate::utils::merge::{pick, pick_group, pick_list, pick_optional, Overlay};

/// Per-deployment settings. Same shape as [`PlatformDefaults`], but every field may be left
/// out: `None` and empty lists inherit the platform value.
///
/// Built fresh for each deployment request and dropped once the workload has been described.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_concurrent_tasks: Option<i32>,

    pub liveness_probe: ProbeOverrides,
    pub readiness_probe: ProbeOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_credentials_secret: Option<String>,

    pub limits: LimitsResources,
    pub requests: RequestsResources,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secret_key_refs: Vec<SecretKeyRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_map_key_refs: Vec<ConfigMapKeyRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config_map_refs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secret_refs: Vec<String>,

    pub stateful_set: StatefulSetOverrides,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point_style: Option<EntryPointStyle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_load_balancer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_network: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_job: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_annotations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_annotations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_annotations: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_to_wait_for_load_balancer: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_terminated_error_restarts: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_crash_loop_back_off_restarts: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<ImagePullPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,

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

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateful_set_init_container_image_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_container: Option<InitContainer>,
}

impl DeploymentOverrides {
    /// Resolves these overrides against the platform defaults.
    ///
    /// Scalars and nested groups are taken field by field, so a deployment can set a readiness
    /// probe path and still inherit the platform's probe timing. List fields are all or nothing:
    /// a non-empty override list replaces the platform list, entries are never combined.
    pub fn resolve(&self, defaults: &PlatformDefaults) -> EffectiveConfiguration {
        EffectiveConfiguration::new(self.overlay(defaults))
    }

    /// True when resolving would hand back the platform defaults unchanged.
    pub fn is_empty(&self) -> bool {
        *self == DeploymentOverrides::default()
    }
}

impl Overlay<PlatformDefaults> for DeploymentOverrides {
    fn overlay(&self, base: &PlatformDefaults) -> PlatformDefaults {
        PlatformDefaults {
            namespace: pick_optional(&self.namespace, &base.namespace),
            maximum_concurrent_tasks: pick(
                &self.maximum_concurrent_tasks,
                &base.maximum_concurrent_tasks,
            ),
            liveness_probe: self.liveness_probe.overlay(&base.liveness_probe),
            readiness_probe: self.readiness_probe.overlay(&base.readiness_probe),
            probe_credentials_secret: pick_optional(
                &self.probe_credentials_secret,
                &base.probe_credentials_secret,
            ),
            limits: self.limits.overlay(&base.limits),
            requests: self.requests.overlay(&base.requests),
            tolerations: pick_list(&self.tolerations, &base.tolerations),
            secret_key_refs: pick_list(&self.secret_key_refs, &base.secret_key_refs),
            config_map_key_refs: pick_list(&self.config_map_key_refs, &base.config_map_key_refs),
            config_map_refs: pick_list(&self.config_map_refs, &base.config_map_refs),
            secret_refs: pick_list(&self.secret_refs, &base.secret_refs),
            stateful_set: self.stateful_set.overlay(&base.stateful_set),
            environment_variables: pick_list(
                &self.environment_variables,
                &base.environment_variables,
            ),
            entry_point_style: pick(&self.entry_point_style, &base.entry_point_style),
            create_load_balancer: pick(&self.create_load_balancer, &base.create_load_balancer),
            host_network: pick(&self.host_network, &base.host_network),
            create_job: pick(&self.create_job, &base.create_job),
            service_annotations: pick_optional(
                &self.service_annotations,
                &base.service_annotations,
            ),
            pod_annotations: pick_optional(&self.pod_annotations, &base.pod_annotations),
            job_annotations: pick_optional(&self.job_annotations, &base.job_annotations),
            minutes_to_wait_for_load_balancer: pick(
                &self.minutes_to_wait_for_load_balancer,
                &base.minutes_to_wait_for_load_balancer,
            ),
            max_terminated_error_restarts: pick(
                &self.max_terminated_error_restarts,
                &base.max_terminated_error_restarts,
            ),
            max_crash_loop_back_off_restarts: pick(
                &self.max_crash_loop_back_off_restarts,
                &base.max_crash_loop_back_off_restarts,
            ),
            image_pull_policy: pick(&self.image_pull_policy, &base.image_pull_policy),
            image_pull_secret: pick_optional(&self.image_pull_secret, &base.image_pull_secret),
            volume_mounts: pick_list(&self.volume_mounts, &base.volume_mounts),
            volumes: pick_list(&self.volumes, &base.volumes),
            node_selector: pick_optional(&self.node_selector, &base.node_selector),
            deployment_service_account_name: pick_optional(
                &self.deployment_service_account_name,
                &base.deployment_service_account_name,
            ),
            pod_security_context: pick_group(
                &self.pod_security_context,
                &base.pod_security_context,
            ),
            node_affinity: pick_optional(&self.node_affinity, &base.node_affinity),
            pod_affinity: pick_optional(&self.pod_affinity, &base.pod_affinity),
            pod_anti_affinity: pick_optional(&self.pod_anti_affinity, &base.pod_anti_affinity),
            stateful_set_init_container_image_name: pick_optional(
                &self.stateful_set_init_container_image_name,
                &base.stateful_set_init_container_image_name,
            ),
            init_container: pick_group(&self.init_container, &base.init_container),
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::{
        HostPathVolumeSource, NodeAffinity, NodeSelector, NodeSelectorRequirement,
        NodeSelectorTerm, Volume, VolumeMount,
    };

    use super::DeploymentOverrides;
    use crate::models::init_container::InitContainer;
    use crate::models::key_ref::{ConfigMapKeyRef, SecretKeyRef};
    use crate::models::platform_defaults::PlatformDefaults;
    use crate::models::policy::{EntryPointStyle, ImagePullPolicy};
    use crate::models::probe::{ProbeOverrides, ProbeSettings};
    use crate::models::resources::{LimitsResources, RequestsResources};
    use crate::models::security_context::PodSecurityContext;
    use crate::models::stateful_set::{
        StatefulSet, StatefulSetOverrides, VolumeClaimTemplate, VolumeClaimTemplateOverrides,
    };
    use crate::models::toleration::Toleration;

    fn host_path_volume(name: &str, path: &str) -> Volume {
        Volume {
            name: name.to_string(),
            host_path: Some(HostPathVolumeSource {
                path: path.to_string(),
                type_: None,
            }),
            ..Default::default()
        }
    }

    fn toleration(key: &str) -> Toleration {
        Toleration {
            key: Some(key.to_string()),
            operator: Some("Exists".to_string()),
            effect: Some("NoSchedule".to_string()),
            ..Default::default()
        }
    }

    fn zone_affinity(zone: &str) -> NodeAffinity {
        NodeAffinity {
            required_during_scheduling_ignored_during_execution: Some(NodeSelector {
                node_selector_terms: vec![NodeSelectorTerm {
                    match_expressions: Some(vec![NodeSelectorRequirement {
                        key: "topology.kubernetes.io/zone".to_string(),
                        operator: "In".to_string(),
                        values: Some(vec![zone.to_string()]),
                    }]),
                    match_fields: None,
                }],
            }),
            preferred_during_scheduling_ignored_during_execution: None,
        }
    }

    /// Platform defaults with a value in every field, so inheritance is observable.
    fn populated_defaults() -> PlatformDefaults {
        PlatformDefaults {
            namespace: Some("platform".to_string()),
            maximum_concurrent_tasks: 20,
            liveness_probe: ProbeSettings {
                path: Some("/health".to_string()),
                port: Some(8080),
                ..ProbeSettings::liveness()
            },
            readiness_probe: ProbeSettings {
                path: Some("/ready".to_string()),
                port: Some(8080),
                ..ProbeSettings::readiness()
            },
            probe_credentials_secret: Some("probe-creds".to_string()),
            limits: LimitsResources {
                cpu: Some("500m".to_string()),
                memory: Some("512Mi".to_string()),
                gpu_vendor: None,
                gpu_count: None,
            },
            requests: RequestsResources {
                cpu: Some("100m".to_string()),
                memory: Some("256Mi".to_string()),
            },
            tolerations: vec![toleration("platform-a"), toleration("platform-b")],
            secret_key_refs: vec![SecretKeyRef::new("DB_PASS", "password", "db")],
            config_map_key_refs: vec![ConfigMapKeyRef::new("LEVEL", "level", "logging")],
            config_map_refs: vec!["platform-config".to_string()],
            secret_refs: vec!["platform-secret".to_string()],
            stateful_set: StatefulSet {
                volume_claim_template: VolumeClaimTemplate {
                    storage: "1Gi".to_string(),
                    storage_class_name: Some("standard".to_string()),
                },
            },
            environment_variables: vec!["A=1".to_string(), "B=2".to_string()],
            entry_point_style: EntryPointStyle::Exec,
            create_load_balancer: false,
            host_network: false,
            create_job: false,
            service_annotations: Some("team:platform".to_string()),
            pod_annotations: Some("scrape:true".to_string()),
            job_annotations: Some("kind:batch".to_string()),
            minutes_to_wait_for_load_balancer: 5,
            max_terminated_error_restarts: 2,
            max_crash_loop_back_off_restarts: 4,
            image_pull_policy: ImagePullPolicy::IfNotPresent,
            image_pull_secret: Some("registry".to_string()),
            volume_mounts: vec![VolumeMount {
                name: "data".to_string(),
                mount_path: "/data".to_string(),
                ..Default::default()
            }],
            volumes: vec![host_path_volume("data", "/mnt/data")],
            node_selector: Some("disktype:ssd".to_string()),
            deployment_service_account_name: Some("deployer".to_string()),
            pod_security_context: Some(PodSecurityContext {
                run_as_user: Some(1000),
                fs_group: Some(2000),
            }),
            node_affinity: Some(zone_affinity("zone-a")),
            pod_affinity: None,
            pod_anti_affinity: None,
            stateful_set_init_container_image_name: Some("busybox:1".to_string()),
            init_container: Some(InitContainer {
                image_name: Some("busybox:1".to_string()),
                container_name: Some("setup".to_string()),
                commands: vec!["sh".to_string(), "-c".to_string(), "true".to_string()],
            }),
        }
    }

    /// Overrides with a value in every field, all different from [`populated_defaults`].
    fn populated_overrides() -> DeploymentOverrides {
        DeploymentOverrides {
            namespace: Some("team".to_string()),
            maximum_concurrent_tasks: Some(3),
            liveness_probe: ProbeOverrides {
                delay: Some(1),
                period: Some(2),
                timeout: Some(3),
                path: Some("/live".to_string()),
                port: Some(9090),
            },
            readiness_probe: ProbeOverrides {
                delay: Some(4),
                period: Some(5),
                timeout: Some(6),
                path: Some("/readyz".to_string()),
                port: Some(9091),
            },
            probe_credentials_secret: Some("team-probe-creds".to_string()),
            limits: LimitsResources {
                cpu: Some("2".to_string()),
                memory: Some("4Gi".to_string()),
                gpu_vendor: Some("nvidia.com".to_string()),
                gpu_count: Some("1".to_string()),
            },
            requests: RequestsResources {
                cpu: Some("1".to_string()),
                memory: Some("2Gi".to_string()),
            },
            tolerations: vec![toleration("team")],
            secret_key_refs: vec![SecretKeyRef::new("API_KEY", "key", "api")],
            config_map_key_refs: vec![ConfigMapKeyRef::new("MODE", "mode", "team-config")],
            config_map_refs: vec!["team-config".to_string()],
            secret_refs: vec!["team-secret".to_string()],
            stateful_set: StatefulSetOverrides {
                volume_claim_template: VolumeClaimTemplateOverrides {
                    storage: Some("20Gi".to_string()),
                    storage_class_name: Some("fast".to_string()),
                },
            },
            environment_variables: vec!["C=3".to_string()],
            entry_point_style: Some(EntryPointStyle::Boot),
            create_load_balancer: Some(true),
            host_network: Some(true),
            create_job: Some(true),
            service_annotations: Some("team:apps".to_string()),
            pod_annotations: Some("scrape:false".to_string()),
            job_annotations: Some("kind:nightly".to_string()),
            minutes_to_wait_for_load_balancer: Some(10),
            max_terminated_error_restarts: Some(7),
            max_crash_loop_back_off_restarts: Some(8),
            image_pull_policy: Some(ImagePullPolicy::Always),
            image_pull_secret: Some("team-registry".to_string()),
            volume_mounts: vec![VolumeMount {
                name: "cache".to_string(),
                mount_path: "/cache".to_string(),
                ..Default::default()
            }],
            volumes: vec![host_path_volume("cache", "/mnt/cache")],
            node_selector: Some("gpu:true".to_string()),
            deployment_service_account_name: Some("team-sa".to_string()),
            pod_security_context: Some(PodSecurityContext {
                run_as_user: Some(65534),
                fs_group: Some(65534),
            }),
            node_affinity: Some(zone_affinity("zone-b")),
            pod_affinity: Some(Default::default()),
            pod_anti_affinity: Some(Default::default()),
            stateful_set_init_container_image_name: Some("alpine:3".to_string()),
            init_container: Some(InitContainer {
                image_name: Some("alpine:3".to_string()),
                container_name: Some("prepare".to_string()),
                commands: vec!["true".to_string()],
            }),
        }
    }

    #[test]
    fn empty_overrides_resolve_to_defaults() {
        let defaults = populated_defaults();
        let overrides = DeploymentOverrides::default();

        assert!(overrides.is_empty());
        assert_eq!(*overrides.resolve(&defaults), defaults);
        assert_eq!(
            *overrides.resolve(&PlatformDefaults::default()),
            PlatformDefaults::default()
        );
    }

    #[test]
    fn full_overrides_win_everywhere() {
        let o = populated_overrides();
        let defaults = populated_defaults();

        let expected = PlatformDefaults {
            namespace: o.namespace.clone(),
            maximum_concurrent_tasks: o.maximum_concurrent_tasks.unwrap(),
            liveness_probe: ProbeSettings {
                delay: o.liveness_probe.delay.unwrap(),
                period: o.liveness_probe.period.unwrap(),
                timeout: o.liveness_probe.timeout.unwrap(),
                path: o.liveness_probe.path.clone(),
                port: o.liveness_probe.port,
            },
            readiness_probe: ProbeSettings {
                delay: o.readiness_probe.delay.unwrap(),
                period: o.readiness_probe.period.unwrap(),
                timeout: o.readiness_probe.timeout.unwrap(),
                path: o.readiness_probe.path.clone(),
                port: o.readiness_probe.port,
            },
            probe_credentials_secret: o.probe_credentials_secret.clone(),
            limits: o.limits.clone(),
            requests: o.requests.clone(),
            tolerations: o.tolerations.clone(),
            secret_key_refs: o.secret_key_refs.clone(),
            config_map_key_refs: o.config_map_key_refs.clone(),
            config_map_refs: o.config_map_refs.clone(),
            secret_refs: o.secret_refs.clone(),
            stateful_set: StatefulSet {
                volume_claim_template: VolumeClaimTemplate {
                    storage: o.stateful_set.volume_claim_template.storage.clone().unwrap(),
                    storage_class_name: o
                        .stateful_set
                        .volume_claim_template
                        .storage_class_name
                        .clone(),
                },
            },
            environment_variables: o.environment_variables.clone(),
            entry_point_style: o.entry_point_style.unwrap(),
            create_load_balancer: o.create_load_balancer.unwrap(),
            host_network: o.host_network.unwrap(),
            create_job: o.create_job.unwrap(),
            service_annotations: o.service_annotations.clone(),
            pod_annotations: o.pod_annotations.clone(),
            job_annotations: o.job_annotations.clone(),
            minutes_to_wait_for_load_balancer: o.minutes_to_wait_for_load_balancer.unwrap(),
            max_terminated_error_restarts: o.max_terminated_error_restarts.unwrap(),
            max_crash_loop_back_off_restarts: o.max_crash_loop_back_off_restarts.unwrap(),
            image_pull_policy: o.image_pull_policy.unwrap(),
            image_pull_secret: o.image_pull_secret.clone(),
            volume_mounts: o.volume_mounts.clone(),
            volumes: o.volumes.clone(),
            node_selector: o.node_selector.clone(),
            deployment_service_account_name: o.deployment_service_account_name.clone(),
            pod_security_context: o.pod_security_context.clone(),
            node_affinity: o.node_affinity.clone(),
            pod_affinity: o.pod_affinity.clone(),
            pod_anti_affinity: o.pod_anti_affinity.clone(),
            stateful_set_init_container_image_name: o
                .stateful_set_init_container_image_name
                .clone(),
            init_container: o.init_container.clone(),
        };

        let effective = o.resolve(&defaults).into_inner();

        assert_eq!(effective, expected);
    }

    #[test]
    fn every_override_differs_from_its_default() {
        let o = populated_overrides();
        let d = populated_defaults();

        assert_ne!(o.namespace, d.namespace);
        assert_ne!(o.liveness_probe.period, Some(d.liveness_probe.period));
        assert_ne!(o.liveness_probe.timeout, Some(d.liveness_probe.timeout));
        assert_ne!(o.liveness_probe.port, d.liveness_probe.port);
        assert_ne!(o.readiness_probe.delay, Some(d.readiness_probe.delay));
        assert_ne!(o.readiness_probe.period, Some(d.readiness_probe.period));
        assert_ne!(o.readiness_probe.path, d.readiness_probe.path);
        assert_ne!(o.probe_credentials_secret, d.probe_credentials_secret);
        assert_ne!(o.service_annotations, d.service_annotations);
        assert_ne!(o.pod_annotations, d.pod_annotations);
        assert_ne!(
            o.minutes_to_wait_for_load_balancer,
            Some(d.minutes_to_wait_for_load_balancer)
        );
        assert_ne!(
            o.max_terminated_error_restarts,
            Some(d.max_terminated_error_restarts)
        );
        assert_ne!(o.image_pull_secret, d.image_pull_secret);
        assert_ne!(
            o.deployment_service_account_name,
            d.deployment_service_account_name
        );
        assert_ne!(
            o.stateful_set_init_container_image_name,
            d.stateful_set_init_container_image_name
        );
        assert_ne!(o.pod_affinity, d.pod_affinity);
        assert_ne!(
            o.stateful_set.volume_claim_template.storage_class_name,
            d.stateful_set.volume_claim_template.storage_class_name
        );
    }

    #[test]
    fn readiness_path_alone_inherits_timing() {
        let defaults = populated_defaults();
        let overrides = DeploymentOverrides {
            readiness_probe: ProbeOverrides {
                path: Some("/custom".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let effective = overrides.resolve(&defaults);

        assert_eq!(effective.readiness_probe.path.as_deref(), Some("/custom"));
        assert_eq!(effective.readiness_probe.delay, defaults.readiness_probe.delay);
        assert_eq!(effective.readiness_probe.port, defaults.readiness_probe.port);
        assert_eq!(effective.liveness_probe, defaults.liveness_probe);
    }

    #[test]
    fn list_override_replaces_instead_of_appending() {
        let defaults = populated_defaults();
        let overrides = DeploymentOverrides {
            tolerations: vec![toleration("team"), toleration("team")],
            volumes: vec![host_path_volume("data", "/mnt/other")],
            ..Default::default()
        };

        let effective = overrides.resolve(&defaults);

        assert_eq!(effective.tolerations, vec![toleration("team"), toleration("team")]);
        assert_eq!(effective.volumes, vec![host_path_volume("data", "/mnt/other")]);
        assert_eq!(effective.volume_mounts, defaults.volume_mounts);
        assert_eq!(effective.environment_variables, defaults.environment_variables);
    }

    #[test]
    fn optional_groups_merge_leaf_by_leaf() {
        let defaults = populated_defaults();
        let overrides = DeploymentOverrides {
            pod_security_context: Some(PodSecurityContext {
                run_as_user: Some(1),
                fs_group: None,
            }),
            init_container: Some(InitContainer {
                container_name: Some("other".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let effective = overrides.resolve(&defaults);

        assert_eq!(
            effective.pod_security_context,
            Some(PodSecurityContext {
                run_as_user: Some(1),
                fs_group: Some(2000),
            })
        );
        let init_container = effective.init_container.clone().unwrap();
        assert_eq!(init_container.container_name.as_deref(), Some("other"));
        assert_eq!(init_container.image_name.as_deref(), Some("busybox:1"));
        assert_eq!(init_container.commands.len(), 3);
    }

    #[test]
    fn override_equal_to_default_is_indistinguishable() {
        let defaults = populated_defaults();
        let overrides = DeploymentOverrides {
            maximum_concurrent_tasks: Some(defaults.maximum_concurrent_tasks),
            ..Default::default()
        };

        assert_eq!(*overrides.resolve(&defaults), defaults);
    }
}
