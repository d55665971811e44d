pub mod image_list;
pub mod tag_table;

/// Replacement text for credentials that are not revealed
pub const MASK: &str = "••••••••••";

/// Credential value as displayed: masked unless revealed, dash when absent
pub fn credential_display(value: Option<&str>, revealed: bool) -> String {
    match value {
        Some(value) if revealed => value.to_string(),
        Some(_) => MASK.to_string(),
        None => "-".to_string(),
    }
}
