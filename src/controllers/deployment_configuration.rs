use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::deployment_overrides::DeploymentOverrides;
use crate::models::effective::EffectiveConfiguration;
use crate::models::platform_defaults::PlatformDefaults;
use crate::utils::error::Error;
use crate::workflows::binding::DeploymentPropertyBinder;
use crate::workflows::workflow::PropertyBinder;

/// Holds the platform defaults, frozen at startup, and resolves deployment requests against them.
///
/// Cloning is cheap and every clone shares the same defaults, so one instance can be handed to
/// each request handler. Nothing here locks: the defaults are never mutated after construction.
#[derive(Clone)]
pub struct DeploymentConfigurationController {
    defaults: Arc<PlatformDefaults>,
    binder: Arc<DeploymentPropertyBinder>,
}

impl DeploymentConfigurationController {
    /// Constructs a new controller.
    ///
    /// # Arguments:
    /// - `defaults`: Fully loaded platform defaults. Ownership moves into the controller and the
    /// value is read-only from here on.
    pub fn new(defaults: PlatformDefaults) -> Self {
        Self::with_binder(defaults, DeploymentPropertyBinder::default())
    }

    /// Same as [`DeploymentConfigurationController::new`], binding deployment properties with
    /// the given binder.
    pub fn with_binder(defaults: PlatformDefaults, binder: DeploymentPropertyBinder) -> Self {
        DeploymentConfigurationController {
            defaults: Arc::new(defaults),
            binder: Arc::new(binder),
        }
    }

    pub fn defaults(&self) -> &PlatformDefaults {
        &self.defaults
    }

    /// Resolves already bound overrides for one deployment.
    pub fn resolve(&self, overrides: &DeploymentOverrides) -> EffectiveConfiguration {
        debug!(
            "Resolving deployment configuration (overrides present: {})",
            !overrides.is_empty()
        );
        overrides.resolve(&self.defaults)
    }

    /// Binds the raw properties of one deployment request and resolves them.
    ///
    /// # Arguments
    /// - `properties`: The deployment's own key/value properties. Keys outside the deployer key
    /// space are ignored.
    pub fn resolve_properties(
        &self,
        properties: &BTreeMap<String, String>,
    ) -> Result<EffectiveConfiguration, Error> {
        let overrides = self.binder.bind(properties)?;
        Ok(self.resolve(&overrides))
    }
}
