use crate::types::StatusMap;

/// Serialize the reconciled map as a pretty-printed JSON object keyed by
/// repository name.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_json(data: &StatusMap, actionable_only: bool) -> serde_json::Result<String> {
    if actionable_only {
        let filtered: StatusMap = data
            .iter()
            .filter(|(_, status)| super::is_actionable(status))
            .map(|(name, status)| (name.clone(), status.clone()))
            .collect();
        serde_json::to_string_pretty(&filtered)
    } else {
        serde_json::to_string_pretty(data)
    }
}
