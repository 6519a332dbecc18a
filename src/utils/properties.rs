use std::collections::BTreeMap;
use std::path::Path;

use crate::utils::error::Error;

/// Reads a `.properties` file into a sorted key/value map.
pub fn read_properties(path: &Path) -> Result<BTreeMap<String, String>, Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_properties(&contents))
}

/// Parses `.properties` text.
///
/// The key ends at the first unescaped `=`, `:` or whitespace. Lines starting with `#` or `!`
/// are comments, and a line ending in an odd number of backslashes continues on the next one.
/// `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded; any other escaped character stands
/// for itself, and a malformed `\u` escape is kept literally. Later lines win over earlier ones.
pub fn parse_properties(contents: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let mut lines = contents.lines();

    while let Some(line) = lines.next() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        properties.insert(unescape(key), unescape(value));
    }

    properties
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..index], line[index + 1..].trim_start()),
            c if c.is_whitespace() => {
                key_end = index;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_end..].trim_start();
    let value = rest
        .strip_prefix(|c: char| c == '=' || c == ':')
        .unwrap_or(rest)
        .trim_start();

    (&line[..key_end], value)
}

fn unescape(raw: &str) -> String {
    let mut unescaped = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => unescaped.push('\t'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('f') => unescaped.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => unescaped.push(decoded),
                    _ => {
                        unescaped.push_str("\\u");
                        unescaped.push_str(&hex);
                    }
                }
            }
            Some(other) => unescaped.push(other),
            None => {}
        }
    }

    unescaped
}
