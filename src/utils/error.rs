/// Utility enum that covers all possible errors while loading and binding deployer properties.
///
/// Resolving overrides never fails; these only surface from the property binders, the
/// properties file reader and the consumer-side parsing helpers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A property value could not be converted into the type of the field it binds to.
    #[error("Invalid value '{value}' for property '{key}': {reason}")]
    InvalidProperty {
        key: String,
        value: String,
        reason: String,
    },

    /// A `key:value` or `KEY=VALUE` entry without its separator.
    #[error("Invalid key/value pair: {0}")]
    InvalidKeyValuePair(String),

    /// Error in user input, typically bad command line arguments.
    #[error("Invalid input: {0}")]
    UserInputError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn invalid_property(key: &str, value: &str, reason: impl ToString) -> Self {
        Error::InvalidProperty {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
