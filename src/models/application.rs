//! Application record model: one tracked email classified into a lifecycle stage.

use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

/// Built-in lifecycle categories, in classification precedence order.
pub mod status {
    pub const APPLICATION_RECEIVED: &str = "application_received";
    pub const REJECTION: &str = "rejection";
    pub const INTERVIEW: &str = "interview";
    pub const OFFER: &str = "offer";
    pub const UNKNOWN: &str = "unknown";
}

/// A structured record derived from one email, before it is written.
///
/// `body` is carried for classification only and is never persisted;
/// `last_updated` is stamped when the row is appended to the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub company: String,
    pub position: String,
    pub status: String,
    pub date: String,
    pub subject: String,
    pub sender: String,
    #[serde(default, skip_serializing)]
    pub body: String,
    pub message_id: String,
}

impl ApplicationRecord {
    /// Table row in header order, stamped with `last_updated`.
    pub fn to_row(&self, last_updated: &str) -> Vec<String> {
        vec![
            self.company.clone(),
            self.position.clone(),
            self.status.clone(),
            self.date.clone(),
            self.subject.clone(),
            self.sender.clone(),
            self.message_id.clone(),
            last_updated.to_string(),
        ]
    }
}

/// Count of records for one status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Count statuses in first-seen order.
pub fn count_by_status<'a, I>(statuses: I) -> Vec<StatusCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<StatusCount> = Vec::new();
    for status in statuses {
        match counts.iter_mut().find(|c| c.status == status) {
            Some(entry) => entry.count += 1,
            None => counts.push(StatusCount {
                status: status.to_string(),
                count: 1,
            }),
        }
    }
    counts
}
