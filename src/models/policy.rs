use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How application arguments are handed to the container entrypoint.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryPointStyle {
    /// Arguments are passed as command line arguments.
    Exec,
    /// Arguments are passed as environment variables.
    Shell,
    /// Arguments are passed as a single JSON-encoded environment variable.
    Boot,
}

impl Default for EntryPointStyle {
    fn default() -> Self {
        EntryPointStyle::Exec
    }
}

impl FromStr for EntryPointStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exec" => Ok(EntryPointStyle::Exec),
            "shell" => Ok(EntryPointStyle::Shell),
            "boot" => Ok(EntryPointStyle::Boot),
            _ => Err("expected one of exec, shell, boot".to_string()),
        }
    }
}

impl fmt::Display for EntryPointStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryPointStyle::Exec => "exec",
            EntryPointStyle::Shell => "shell",
            EntryPointStyle::Boot => "boot",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, JsonSchema)]
pub enum ImagePullPolicy {
    IfNotPresent,
    Always,
    Never,
}

impl Default for ImagePullPolicy {
    fn default() -> Self {
        ImagePullPolicy::IfNotPresent
    }
}

impl FromStr for ImagePullPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ifnotpresent" => Ok(ImagePullPolicy::IfNotPresent),
            "always" => Ok(ImagePullPolicy::Always),
            "never" => Ok(ImagePullPolicy::Never),
            _ => Err("expected one of IfNotPresent, Always, Never".to_string()),
        }
    }
}

impl fmt::Display for ImagePullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImagePullPolicy::IfNotPresent => "IfNotPresent",
            ImagePullPolicy::Always => "Always",
            ImagePullPolicy::Never => "Never",
        };
        f.write_str(name)
    }
}
