//! Generated resource names.

use uuid::Uuid;

/// `prefix` followed by random lowercase hex, at most `max_len` chars.
/// Non-alphanumeric characters are dropped from the prefix so the result
/// is valid for the strictest ARM naming rules (e.g. storage accounts).
pub fn random_resource_name(prefix: &str, max_len: usize) -> String {
    let mut name: String = prefix
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let random = Uuid::new_v4().simple().to_string();
    name.push_str(&random);
    name.truncate(max_len);
    name
}
