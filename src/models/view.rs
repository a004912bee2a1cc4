use std::collections::HashSet;

use serde::Serialize;

use crate::host::ResolvedUser;

/// Moderation status shown next to a blacklist entry. Auto-ban wins over a
/// plain session ban when a user carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusLabel {
    #[serde(rename = "Auto-Banned")]
    AutoBanned,
    #[serde(rename = "Banned")]
    Banned,
}

pub fn status_label(
    user_id: &str,
    autoban: &HashSet<String>,
    banned: &HashSet<String>,
) -> Option<StatusLabel> {
    if autoban.contains(user_id) {
        Some(StatusLabel::AutoBanned)
    } else if banned.contains(user_id) {
        Some(StatusLabel::Banned)
    } else {
        None
    }
}

/// One row of the blacklist view: the resolved profile, the stored reason if
/// any, and the status label.
#[derive(Debug, Clone, Serialize)]
pub struct BlacklistEntryView {
    #[serde(flatten)]
    pub user: ResolvedUser,
    pub reason: Option<String>,
    pub status: Option<StatusLabel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Blacklist,
    Unblacklist,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub user_id: String,
}
