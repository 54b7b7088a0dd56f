use std::env;
use std::path::PathBuf;

/// Column headers of the tracker table, in write order.
pub const TABLE_HEADERS: [&str; 8] = [
    "Company",
    "Position",
    "Status",
    "Date",
    "Subject",
    "Sender",
    "Message ID",
    "Last Updated",
];

/// Mail search terms OR-ed together when querying the provider.
pub const DEFAULT_SEARCH_TERMS: [&str; 8] = [
    "\"thanks for applying\"",
    "\"application received\"",
    "\"thank you for your interest\"",
    "\"unfortunately\"",
    "\"interview\"",
    "\"job offer\"",
    "\"application confirmation\"",
    "\"we have received your application\"",
];

/// Consumer mail domains that never identify an employer.
pub const DEFAULT_GENERIC_DOMAINS: [&str; 7] = [
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "icloud.com",
    "aol.com",
    "protonmail.com",
];

/// Which upstream supplies raw emails.
#[derive(Debug, Clone, PartialEq)]
pub enum MailSourceKind {
    Gmail,
    Fixture,
}

impl std::fmt::Display for MailSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gmail => write!(f, "gmail"),
            Self::Fixture => write!(f, "fixture"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub tracker_path: PathBuf,
    pub tracker_sheet: String,
    pub mail_source: MailSourceKind,
    pub gmail_access_token: Option<String>,
    pub gmail_api_base: String,
    pub mail_fixture_path: Option<PathBuf>,
    pub max_search_results: u32,
    pub generic_domains: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            tracker_path: PathBuf::from("job_applications.csv"),
            tracker_sheet: "Applications".to_string(),
            mail_source: MailSourceKind::Gmail,
            gmail_access_token: None,
            gmail_api_base: "https://gmail.googleapis.com/gmail/v1".to_string(),
            mail_fixture_path: None,
            max_search_results: 100,
            generic_domains: DEFAULT_GENERIC_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let mail_source = match env::var("MAIL_SOURCE")
            .unwrap_or_else(|_| "gmail".to_string())
            .to_lowercase()
            .as_str()
        {
            "gmail" => MailSourceKind::Gmail,
            "fixture" => MailSourceKind::Fixture,
            other => return Err(format!("Unsupported MAIL_SOURCE '{other}'. Supported: gmail, fixture")),
        };

        let mail_fixture_path = env::var("MAIL_FIXTURE_PATH").ok().map(PathBuf::from);
        if mail_source == MailSourceKind::Fixture && mail_fixture_path.is_none() {
            return Err("MAIL_FIXTURE_PATH must be set when MAIL_SOURCE=fixture".to_string());
        }

        Ok(Self {
            host: env::var("BACKEND_HOST").unwrap_or(defaults.host),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(defaults.port),
            tracker_path: env::var("TRACKER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tracker_path),
            tracker_sheet: env::var("TRACKER_SHEET").unwrap_or(defaults.tracker_sheet),
            mail_source,
            gmail_access_token: env::var("GMAIL_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            gmail_api_base: env::var("GMAIL_API_BASE").unwrap_or(defaults.gmail_api_base),
            mail_fixture_path,
            max_search_results: env::var("MAX_SEARCH_RESULTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(defaults.max_search_results),
            generic_domains: env::var("GENERIC_EMAIL_DOMAINS")
                .ok()
                .map(|raw| parse_domain_list(&raw))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.generic_domains),
        })
    }
}

/// Split a comma-separated domain list, lower-casing and dropping blanks.
fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
