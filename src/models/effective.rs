use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Deref;

use super::platform_defaults::PlatformDefaults;
use crate::utils::error::Error;
use crate::utils::pairs::{parse_assignments, parse_pairs};

/// Resolved settings used to describe one workload.
///
/// Read-only: it dereferences to the resolved values but hands out no mutable access.
#[derive(Serialize, Debug, PartialEq, Clone)]
#[serde(transparent)]
pub struct EffectiveConfiguration(PlatformDefaults);

impl EffectiveConfiguration {
    pub(crate) fn new(resolved: PlatformDefaults) -> Self {
        EffectiveConfiguration(resolved)
    }

    pub fn into_inner(self) -> PlatformDefaults {
        self.0
    }

    pub fn service_annotation_map(&self) -> Result<BTreeMap<String, String>, Error> {
        optional_pairs(&self.0.service_annotations)
    }

    pub fn pod_annotation_map(&self) -> Result<BTreeMap<String, String>, Error> {
        optional_pairs(&self.0.pod_annotations)
    }

    pub fn job_annotation_map(&self) -> Result<BTreeMap<String, String>, Error> {
        optional_pairs(&self.0.job_annotations)
    }

    pub fn node_selector_map(&self) -> Result<BTreeMap<String, String>, Error> {
        optional_pairs(&self.0.node_selector)
    }

    pub fn environment_variable_map(&self) -> Result<BTreeMap<String, String>, Error> {
        parse_assignments(self.0.environment_variables.iter().map(String::as_str))
    }
}

impl Deref for EffectiveConfiguration {
    type Target = PlatformDefaults;

    fn deref(&self) -> &PlatformDefaults {
        &self.0
    }
}

fn optional_pairs(value: &Option<String>) -> Result<BTreeMap<String, String>, Error> {
    match value {
        Some(value) => parse_pairs(value),
        None => Ok(BTreeMap::new()),
    }
}
