//! Company, position, and date extraction from raw email headers.
//!
//! Company comes from the sender's domain, position from the first matching
//! subject pattern, and the date from the RFC-2822 style `Date` header. Any
//! field that cannot be derived falls back to a default instead of failing.

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate};
use regex::{Regex, RegexBuilder};

use crate::models::application::{status, ApplicationRecord, UNKNOWN};
use crate::models::email::RawEmail;

/// Subject patterns tried in order; capture group 1 is the position.
const POSITION_PATTERNS: [&str; 3] = [
    r"(?:for\s+(?:the\s+)?)?(?:position\s+of\s+)?([a-zA-Z\s]+?)(?:\s+position|\s+role|\s+at|\s+-)",
    r"(?:role:\s*|position:\s*)([a-zA-Z\s]+)",
    r"application\s+for\s+([a-zA-Z\s]+?)(?:\s+at|\s+-|\s+position)",
];

const DATE_HEADER_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Derives company, position, and date fields from raw emails.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    generic_domains: HashSet<String>,
    position_patterns: Vec<Regex>,
}

impl FieldExtractor {
    /// Build an extractor that ignores the given consumer-mail domains.
    pub fn new<I, S>(generic_domains: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let position_patterns = POSITION_PATTERNS
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            generic_domains: generic_domains
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .collect(),
            position_patterns,
        })
    }

    /// Company name from the sender's domain, or `"Unknown"`.
    pub fn extract_company(&self, sender: &str) -> String {
        let Some(domain) = sender.split('@').nth(1) else {
            return UNKNOWN.to_string();
        };
        let domain = domain.to_lowercase();
        if self.generic_domains.contains(&domain) {
            return UNKNOWN.to_string();
        }

        let label = domain.split('.').next().unwrap_or_default();
        title_case(label)
    }

    /// Position from the first subject pattern that matches, or `"Unknown"`.
    ///
    /// Later patterns are not consulted once one matches, even if they
    /// would capture a better value.
    pub fn extract_position(&self, subject: &str) -> String {
        self.position_patterns
            .iter()
            .find_map(|re| re.captures(subject))
            .and_then(|caps| caps.get(1))
            .map(|m| title_case(m.as_str().trim()))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Normalize a raw email into an unclassified application record.
    pub fn to_record(&self, email: &RawEmail) -> ApplicationRecord {
        ApplicationRecord {
            company: self.extract_company(&email.sender),
            position: self.extract_position(&email.subject),
            status: status::UNKNOWN.to_string(),
            date: parse_email_date(&email.date_header),
            subject: email.subject.clone(),
            sender: email.sender.clone(),
            body: email.body.clone(),
            message_id: email.message_id.clone(),
        }
    }
}

/// `YYYY-MM-DD` from a `Date` header, falling back to today's date.
pub fn parse_email_date(date_header: &str) -> String {
    let date = parse_date_header(date_header).unwrap_or_else(|| {
        tracing::warn!(date_header, "Unparseable date header, using processing date");
        Local::now().date_naive()
    });
    date.format("%Y-%m-%d").to_string()
}

/// Parse `"Weekday, DD Mon YYYY HH:MM:SS +ZZZZ"`, ignoring a trailing
/// parenthesized zone name such as `(UTC)`.
fn parse_date_header(date_header: &str) -> Option<NaiveDate> {
    let stripped = date_header.split(" (").next().unwrap_or_default();
    DateTime::parse_from_str(stripped, DATE_HEADER_FORMAT)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Capitalize the first letter of every alphabetic run and lower-case the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
