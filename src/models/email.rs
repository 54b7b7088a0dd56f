//! Raw email as supplied by the mail-fetch collaborator.

use serde::{Deserialize, Serialize};

/// A fetched email, reduced to the fields the tracker reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEmail {
    pub subject: String,
    pub sender: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub date_header: String,
    pub message_id: String,
}

/// Node of a MIME part tree, independent of any provider's message type.
///
/// `data` carries the part's base64url-encoded content as delivered by the
/// provider; container parts carry `parts` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePart {
    pub mime_type: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[cfg(test)]
impl MessagePart {
    pub fn leaf(mime_type: &str, data: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: Some(data.to_string()),
            parts: Vec::new(),
        }
    }

    pub fn container(mime_type: &str, parts: Vec<MessagePart>) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: None,
            parts,
        }
    }
}
