use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maps one environment variable to one key inside a named secret or config map.
///
/// `env_var_name` should be unique across the refs a workload ends up with; that is checked by
/// whoever builds the container, not here.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyRef<S> {
    pub env_var_name: String,
    pub data_key: String,
    #[serde(flatten)]
    pub source: S,
}

pub type SecretKeyRef = KeyRef<SecretSource>;
pub type ConfigMapKeyRef = KeyRef<ConfigMapSource>;

/// Object a [`KeyRef`] reads its key from.
pub trait KeyRefSource {
    fn name(&self) -> &str;
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretSource {
    pub secret_name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapSource {
    pub config_map_name: String,
}

impl KeyRefSource for SecretSource {
    fn name(&self) -> &str {
        &self.secret_name
    }
}

impl KeyRefSource for ConfigMapSource {
    fn name(&self) -> &str {
        &self.config_map_name
    }
}

impl SecretKeyRef {
    pub fn new(env_var_name: &str, data_key: &str, secret_name: &str) -> Self {
        KeyRef {
            env_var_name: env_var_name.to_string(),
            data_key: data_key.to_string(),
            source: SecretSource {
                secret_name: secret_name.to_string(),
            },
        }
    }
}

impl ConfigMapKeyRef {
    pub fn new(env_var_name: &str, data_key: &str, config_map_name: &str) -> Self {
        KeyRef {
            env_var_name: env_var_name.to_string(),
            data_key: data_key.to_string(),
            source: ConfigMapSource {
                config_map_name: config_map_name.to_string(),
            },
        }
    }
}

impl<S: KeyRefSource> KeyRef<S> {
    /// Name of the secret or config map the key is read from.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}
