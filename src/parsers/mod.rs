//! Normalizers turning raw email data into tracker fields.
//!
//! `email_fields` derives company, position, and date from headers;
//! `mime` pulls the plain-text body out of a provider's part tree.

pub mod email_fields;
pub mod mime;

pub use email_fields::{parse_email_date, FieldExtractor};
pub use mime::extract_body;
