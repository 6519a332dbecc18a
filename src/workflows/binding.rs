use log::{debug, info, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::models::deployment_overrides::DeploymentOverrides;
use crate::models::init_container::InitContainer;
use crate::models::key_ref::{ConfigMapKeyRef, SecretKeyRef};
use crate::models::platform_defaults::PlatformDefaults;
use crate::models::security_context::PodSecurityContext;
use crate::models::toleration::Toleration;
use crate::utils::error::Error;
use crate::utils::merge::Overlay;
use crate::workflows::workflow::PropertyBinder;

/// Key space shared by platform and per-deployment properties.
pub const DEPLOYER_PROPERTIES_PREFIX: &str = "spring.cloud.deployer.kubernetes";

/// The only key a deployment may set its node selector through.
pub const DEPLOYMENT_NODE_SELECTOR_KEY: &str =
    "spring.cloud.deployer.kubernetes.deployment.nodeSelector";

const TOLERATION_FIELDS: &[&str] = &["key", "operator", "value", "effect", "tolerationseconds"];
const SECRET_KEY_REF_FIELDS: &[&str] = &["envvarname", "datakey", "secretname"];
const CONFIG_MAP_KEY_REF_FIELDS: &[&str] = &["envvarname", "datakey", "configmapname"];

/// Binds operator supplied properties into the process-wide [`PlatformDefaults`].
pub struct PlatformPropertyBinder {
    pub prefix: String,
}

/// Binds the properties of a single deployment request into [`DeploymentOverrides`].
pub struct DeploymentPropertyBinder {
    pub prefix: String,
}

impl Default for PlatformPropertyBinder {
    fn default() -> Self {
        PlatformPropertyBinder {
            prefix: DEPLOYER_PROPERTIES_PREFIX.to_string(),
        }
    }
}

impl Default for DeploymentPropertyBinder {
    fn default() -> Self {
        DeploymentPropertyBinder {
            prefix: DEPLOYER_PROPERTIES_PREFIX.to_string(),
        }
    }
}

impl PropertyBinder for PlatformPropertyBinder {
    type Output = PlatformDefaults;

    /// Properties are laid over the built-in defaults, so anything not mentioned keeps its
    /// default value.
    fn bind(&self, properties: &BTreeMap<String, String>) -> Result<PlatformDefaults, Error> {
        let overrides = Binding::new(Scope::Platform).bind_all(&self.prefix, properties)?;
        Ok(overrides.overlay(&PlatformDefaults::default()))
    }
}

impl PropertyBinder for DeploymentPropertyBinder {
    type Output = DeploymentOverrides;

    fn bind(&self, properties: &BTreeMap<String, String>) -> Result<DeploymentOverrides, Error> {
        Binding::new(Scope::Deployment).bind_all(&self.prefix, properties)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Scope {
    Platform,
    Deployment,
}

/// Indexed entries of a structured list: index -> field -> (original key, value).
type IndexedFields = BTreeMap<usize, BTreeMap<String, (String, String)>>;

struct Binding {
    scope: Scope,
    indexed_segment: Regex,
    overrides: DeploymentOverrides,
    bound: usize,

    tolerations: IndexedFields,
    secret_key_refs: IndexedFields,
    config_map_key_refs: IndexedFields,
    environment_variables: BTreeMap<usize, String>,
    config_map_refs: BTreeMap<usize, String>,
    secret_refs: BTreeMap<usize, String>,
    init_container_commands: BTreeMap<usize, String>,
}

impl Binding {
    fn new(scope: Scope) -> Self {
        Binding {
            scope,
            indexed_segment: Regex::new(r"^([a-z0-9]+)\[(\d+)\]$").expect("static regex"),
            overrides: DeploymentOverrides::default(),
            bound: 0,
            tolerations: BTreeMap::new(),
            secret_key_refs: BTreeMap::new(),
            config_map_key_refs: BTreeMap::new(),
            environment_variables: BTreeMap::new(),
            config_map_refs: BTreeMap::new(),
            secret_refs: BTreeMap::new(),
            init_container_commands: BTreeMap::new(),
        }
    }

    fn bind_all(
        mut self,
        prefix: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<DeploymentOverrides, Error> {
        let prefix = canonical_path(prefix);

        // Bound in canonical order so a whole group value always lands before its leaves,
        // whatever spelling the keys use.
        let mut entries: Vec<(Vec<String>, &String, &String)> = Vec::new();
        for (key, value) in properties {
            let path = canonical_path(key);
            if path.len() <= prefix.len() || path[..prefix.len()] != prefix[..] {
                debug!("Skipping property outside the deployer key space: {}", key);
                continue;
            }
            entries.push((path[prefix.len()..].to_vec(), key, value));
        }
        entries.sort_by(|left, right| left.0.cmp(&right.0));

        for (path, key, value) in entries {
            self.bind_property(key, &path, value)?;
        }

        info!(
            "Bound {} {:?} deployer properties",
            self.bound, self.scope
        );

        self.finish()
    }

    fn bind_property(&mut self, key: &str, path: &[String], value: &str) -> Result<(), Error> {
        let (name, index) = self.split_index(key, &path[0])?;
        let rest: Vec<&str> = path[1..].iter().map(String::as_str).collect();
        let o = &mut self.overrides;

        match (name.as_str(), index, rest.as_slice()) {
            ("namespace", None, []) => o.namespace = Some(value.to_string()),
            ("maximumconcurrenttasks", None, []) => {
                o.maximum_concurrent_tasks = Some(parse_value(key, value)?)
            }

            ("livenessprobedelay", None, []) => o.liveness_probe.delay = Some(parse_value(key, value)?),
            ("livenessprobeperiod", None, []) => o.liveness_probe.period = Some(parse_value(key, value)?),
            ("livenessprobetimeout", None, []) => o.liveness_probe.timeout = Some(parse_value(key, value)?),
            ("livenessprobepath", None, []) => o.liveness_probe.path = Some(value.to_string()),
            ("livenessprobeport", None, []) => o.liveness_probe.port = Some(parse_value(key, value)?),
            ("readinessprobedelay", None, []) => o.readiness_probe.delay = Some(parse_value(key, value)?),
            ("readinessprobeperiod", None, []) => o.readiness_probe.period = Some(parse_value(key, value)?),
            ("readinessprobetimeout", None, []) => o.readiness_probe.timeout = Some(parse_value(key, value)?),
            ("readinessprobepath", None, []) => o.readiness_probe.path = Some(value.to_string()),
            ("readinessprobeport", None, []) => o.readiness_probe.port = Some(parse_value(key, value)?),
            ("probecredentialssecret", None, []) => {
                o.probe_credentials_secret = Some(value.to_string())
            }

            ("limits", None, ["cpu"]) => o.limits.cpu = Some(value.to_string()),
            ("limits", None, ["memory"]) => o.limits.memory = Some(value.to_string()),
            ("limits", None, ["gpuvendor"]) => o.limits.gpu_vendor = Some(value.to_string()),
            ("limits", None, ["gpucount"]) => o.limits.gpu_count = Some(value.to_string()),
            ("requests", None, ["cpu"]) => o.requests.cpu = Some(value.to_string()),
            ("requests", None, ["memory"]) => o.requests.memory = Some(value.to_string()),

            ("tolerations", None, []) => o.tolerations = parse_json(key, value)?,
            ("tolerations", Some(i), [field]) if TOLERATION_FIELDS.contains(field) => {
                insert_field(&mut self.tolerations, i, field, key, value)
            }
            ("secretkeyrefs", None, []) => o.secret_key_refs = parse_json(key, value)?,
            ("secretkeyrefs", Some(i), [field]) if SECRET_KEY_REF_FIELDS.contains(field) => {
                insert_field(&mut self.secret_key_refs, i, field, key, value)
            }
            ("configmapkeyrefs", None, []) => o.config_map_key_refs = parse_json(key, value)?,
            ("configmapkeyrefs", Some(i), [field]) if CONFIG_MAP_KEY_REF_FIELDS.contains(field) => {
                insert_field(&mut self.config_map_key_refs, i, field, key, value)
            }
            ("configmaprefs", None, []) => o.config_map_refs = split_list(value),
            ("configmaprefs", Some(i), []) => {
                self.config_map_refs.insert(i, value.to_string());
            }
            ("secretrefs", None, []) => o.secret_refs = split_list(value),
            ("secretrefs", Some(i), []) => {
                self.secret_refs.insert(i, value.to_string());
            }

            ("statefulset", None, ["volumeclaimtemplate", "storage"]) => {
                o.stateful_set.volume_claim_template.storage = Some(value.to_string())
            }
            ("statefulset", None, ["volumeclaimtemplate", "storageclassname"]) => {
                o.stateful_set.volume_claim_template.storage_class_name = Some(value.to_string())
            }

            ("environmentvariables", None, []) => o.environment_variables = split_list(value),
            ("environmentvariables", Some(i), []) => {
                self.environment_variables.insert(i, value.to_string());
            }
            ("entrypointstyle", None, []) => o.entry_point_style = Some(parse_value(key, value)?),

            ("createloadbalancer", None, []) => o.create_load_balancer = Some(parse_flag(key, value)?),
            ("hostnetwork", None, []) => o.host_network = Some(parse_flag(key, value)?),
            ("createjob", None, []) => o.create_job = Some(parse_flag(key, value)?),

            ("serviceannotations", None, []) => o.service_annotations = Some(value.to_string()),
            ("podannotations", None, []) => o.pod_annotations = Some(value.to_string()),
            ("jobannotations", None, []) => o.job_annotations = Some(value.to_string()),

            ("minutestowaitforloadbalancer", None, []) => {
                o.minutes_to_wait_for_load_balancer = Some(parse_value(key, value)?)
            }
            ("maxterminatederrorrestarts", None, []) => {
                o.max_terminated_error_restarts = Some(parse_value(key, value)?)
            }
            ("maxcrashloopbackoffrestarts", None, []) => {
                o.max_crash_loop_back_off_restarts = Some(parse_value(key, value)?)
            }

            ("imagepullpolicy", None, []) => o.image_pull_policy = Some(parse_value(key, value)?),
            ("imagepullsecret", None, []) => o.image_pull_secret = Some(value.to_string()),

            ("volumemounts", None, []) => o.volume_mounts = parse_json(key, value)?,
            ("volumes", None, []) => o.volumes = parse_json(key, value)?,

            ("nodeselector", None, []) if self.scope == Scope::Platform => {
                o.node_selector = Some(value.to_string())
            }
            ("deployment", None, ["nodeselector"]) if self.scope == Scope::Deployment => {
                o.node_selector = Some(value.to_string())
            }

            ("deploymentserviceaccountname", None, []) => {
                o.deployment_service_account_name = Some(value.to_string())
            }
            ("podsecuritycontext", None, []) => o.pod_security_context = Some(parse_json(key, value)?),
            ("podsecuritycontext", None, ["runasuser"]) => {
                security_context(o).run_as_user = Some(parse_value(key, value)?)
            }
            ("podsecuritycontext", None, ["fsgroup"]) => {
                security_context(o).fs_group = Some(parse_value(key, value)?)
            }

            ("nodeaffinity", None, []) => o.node_affinity = Some(parse_json(key, value)?),
            ("podaffinity", None, []) => o.pod_affinity = Some(parse_json(key, value)?),
            ("podantiaffinity", None, []) => o.pod_anti_affinity = Some(parse_json(key, value)?),

            ("statefulsetinitcontainerimagename", None, []) => {
                o.stateful_set_init_container_image_name = Some(value.to_string())
            }
            ("initcontainer", None, []) => o.init_container = Some(parse_json(key, value)?),
            ("initcontainer", None, ["imagename"]) => {
                init_container(o).image_name = Some(value.to_string())
            }
            ("initcontainer", None, ["containername"]) => {
                init_container(o).container_name = Some(value.to_string())
            }
            ("initcontainer", None, ["commands"]) => init_container(o).commands = split_list(value),
            ("initcontainer", None, [commands]) => match self.split_index(key, commands)? {
                (field, Some(i)) if field == "commands" => {
                    init_container(&mut self.overrides);
                    self.init_container_commands.insert(i, value.to_string());
                }
                _ => return Ok(skip(key)),
            },

            _ => return Ok(skip(key)),
        }

        self.bound += 1;
        Ok(())
    }

    fn split_index(&self, key: &str, segment: &str) -> Result<(String, Option<usize>), Error> {
        match self.indexed_segment.captures(segment) {
            Some(captures) => {
                let index = captures[2]
                    .parse::<usize>()
                    .map_err(|err| Error::invalid_property(key, &captures[2], err))?;
                Ok((captures[1].to_string(), Some(index)))
            }
            None => Ok((segment.to_string(), None)),
        }
    }

    fn finish(mut self) -> Result<DeploymentOverrides, Error> {
        if !self.tolerations.is_empty() {
            self.overrides.tolerations = self
                .tolerations
                .values()
                .map(toleration)
                .collect::<Result<_, _>>()?;
        }
        if !self.secret_key_refs.is_empty() {
            self.overrides.secret_key_refs = self
                .secret_key_refs
                .iter()
                .map(|(index, fields)| {
                    SecretKeyRef::new(
                        required_field(fields, "secretKeyRefs", *index, "envvarname"),
                        required_field(fields, "secretKeyRefs", *index, "datakey"),
                        required_field(fields, "secretKeyRefs", *index, "secretname"),
                    )
                })
                .collect();
        }
        if !self.config_map_key_refs.is_empty() {
            self.overrides.config_map_key_refs = self
                .config_map_key_refs
                .iter()
                .map(|(index, fields)| {
                    ConfigMapKeyRef::new(
                        required_field(fields, "configMapKeyRefs", *index, "envvarname"),
                        required_field(fields, "configMapKeyRefs", *index, "datakey"),
                        required_field(fields, "configMapKeyRefs", *index, "configmapname"),
                    )
                })
                .collect();
        }
        if !self.environment_variables.is_empty() {
            self.overrides.environment_variables =
                self.environment_variables.into_iter().map(|(_, v)| v).collect();
        }
        if !self.config_map_refs.is_empty() {
            self.overrides.config_map_refs =
                self.config_map_refs.into_iter().map(|(_, v)| v).collect();
        }
        if !self.secret_refs.is_empty() {
            self.overrides.secret_refs = self.secret_refs.into_iter().map(|(_, v)| v).collect();
        }
        if !self.init_container_commands.is_empty() {
            init_container(&mut self.overrides).commands =
                self.init_container_commands.into_iter().map(|(_, v)| v).collect();
        }

        Ok(self.overrides)
    }
}

/// Lowercases each dotted segment and drops `-` and `_`, so `liveness-probe-delay`,
/// `livenessProbeDelay` and `liveness_probe_delay` all name the same property.
fn canonical_path(key: &str) -> Vec<String> {
    key.trim()
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .chars()
                .filter(|c| *c != '-' && *c != '_')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .collect()
}

fn skip(key: &str) {
    debug!("Skipping unknown deployer property: {}", key);
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| Error::invalid_property(key, value, err))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, Error> {
    parse_value(key, &value.to_ascii_lowercase())
}

fn parse_json<T: DeserializeOwned>(key: &str, value: &str) -> Result<T, Error> {
    serde_json::from_str(value).map_err(|err| Error::invalid_property(key, value, err))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn insert_field(entries: &mut IndexedFields, index: usize, field: &str, key: &str, value: &str) {
    entries
        .entry(index)
        .or_default()
        .insert(field.to_string(), (key.to_string(), value.to_string()));
}

/// Key refs keep their shape even when an indexed entry leaves a field out; the gap is logged
/// and the field bound empty.
fn required_field<'a>(
    fields: &'a BTreeMap<String, (String, String)>,
    list: &str,
    index: usize,
    name: &str,
) -> &'a str {
    match fields.get(name) {
        Some((_, value)) => value.as_str(),
        None => {
            warn!("{}[{}] has no '{}', binding it empty", list, index, name);
            ""
        }
    }
}

fn optional_field(fields: &BTreeMap<String, (String, String)>, name: &str) -> Option<String> {
    fields.get(name).map(|(_, value)| value.clone())
}

fn toleration(fields: &BTreeMap<String, (String, String)>) -> Result<Toleration, Error> {
    let toleration_seconds = match fields.get("tolerationseconds") {
        Some((key, value)) => Some(parse_value(key, value)?),
        None => None,
    };

    Ok(Toleration {
        key: optional_field(fields, "key"),
        operator: optional_field(fields, "operator"),
        value: optional_field(fields, "value"),
        effect: optional_field(fields, "effect"),
        toleration_seconds,
    })
}

fn security_context(overrides: &mut DeploymentOverrides) -> &mut PodSecurityContext {
    overrides
        .pod_security_context
        .get_or_insert_with(PodSecurityContext::default)
}

fn init_container(overrides: &mut DeploymentOverrides) -> &mut InitContainer {
    overrides
        .init_container
        .get_or_insert_with(InitContainer::default)
}
