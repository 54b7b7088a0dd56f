//! Plain-text body extraction from a MIME part tree.

use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::models::email::MessagePart;

const TEXT_PLAIN: &str = "text/plain";
const MULTIPART_ALTERNATIVE: &str = "multipart/alternative";

/// Providers send base64url both with and without padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Concatenate the decoded `text/plain` content of a part tree.
///
/// Children of a container are visited in order: `text/plain` parts are
/// decoded, `multipart/alternative` parts are descended into, and anything
/// else (HTML, attachments, nested mixed containers) is ignored.
pub fn extract_body(part: &MessagePart) -> String {
    let mut body = String::new();

    if part.parts.is_empty() {
        if part.mime_type == TEXT_PLAIN {
            append_decoded(&mut body, part);
        }
        return body;
    }

    for child in &part.parts {
        match child.mime_type.as_str() {
            TEXT_PLAIN => append_decoded(&mut body, child),
            MULTIPART_ALTERNATIVE => body.push_str(&extract_body(child)),
            _ => {}
        }
    }
    body
}

fn append_decoded(body: &mut String, part: &MessagePart) {
    let Some(data) = part.data.as_deref().filter(|d| !d.is_empty()) else {
        return;
    };
    match URL_SAFE_LENIENT.decode(data.trim()) {
        Ok(bytes) => body.push_str(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::warn!(error = %e, mime_type = %part.mime_type, "Skipping undecodable body part");
        }
    }
}
