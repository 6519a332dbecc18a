use std::collections::BTreeMap;

use crate::utils::error::Error;

/// Parses `key:value[,key:value...]` strings as used by annotations and node selectors.
///
/// Keys and values are trimmed and empty segments skipped. Only the first `:` separates, so
/// values such as URLs survive intact.
pub fn parse_pairs(input: &str) -> Result<BTreeMap<String, String>, Error> {
    split_entries(input.split(','), ':')
}

/// Parses `KEY=VALUE` entries, splitting each at the first `=`.
pub fn parse_assignments<'a, I>(entries: I) -> Result<BTreeMap<String, String>, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    split_entries(entries, '=')
}

fn split_entries<'a, I>(entries: I, separator: char) -> Result<BTreeMap<String, String>, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut pairs = BTreeMap::new();

    for entry in entries {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        match entry.split_once(separator) {
            Some((key, value)) if !key.trim().is_empty() => {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => return Err(Error::InvalidKeyValuePair(entry.to_string())),
        }
    }

    Ok(pairs)
}
