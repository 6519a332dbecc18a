//! Configuration schema for launching application workloads onto Kubernetes: process-wide
//! platform defaults, per-deployment overrides, and the rule that resolves the two into the
//! effective configuration a workload is built from.

pub mod controllers;
pub mod models;
pub mod utils;
pub mod workflows;

pub use controllers::deployment_configuration::DeploymentConfigurationController;
pub use models::deployment_overrides::DeploymentOverrides;
pub use models::effective::EffectiveConfiguration;
pub use models::platform_defaults::PlatformDefaults;
pub use utils::error::Error;
pub use workflows::binding::{DeploymentPropertyBinder, PlatformPropertyBinder};
pub use workflows::workflow::PropertyBinder;
