use std::collections::BTreeMap;

use crate::utils::error::Error;

/// Turns flat, dotted-path key/value properties into a typed configuration record.
pub trait PropertyBinder {
    type Output;

    fn bind(&self, properties: &BTreeMap<String, String>) -> Result<Self::Output, Error>;
}
