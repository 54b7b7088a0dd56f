pub mod config;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod routes;
pub mod services;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::config::{AppConfig, MailSourceKind};
use crate::errors::AppError;
use crate::parsers::FieldExtractor;
use crate::services::classifier::StatusClassifier;
use crate::services::mail::{FixtureSource, GmailSource, MailSource};

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub mail: Arc<dyn MailSource>,
    pub extractor: Arc<FieldExtractor>,
    /// Category patterns live for the process; additions are not persisted.
    pub classifier: Arc<RwLock<StatusClassifier>>,
    /// Serializes tracker operations so each runs to completion alone.
    pub tracker_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Build state around an explicit mail source.
    pub fn new(config: AppConfig, mail: Arc<dyn MailSource>) -> Result<Self, AppError> {
        let extractor = FieldExtractor::new(&config.generic_domains)
            .map_err(|e| AppError::Internal(format!("Invalid position pattern: {e}")))?;
        Ok(Self {
            config,
            mail,
            extractor: Arc::new(extractor),
            classifier: Arc::new(RwLock::new(StatusClassifier::with_defaults()?)),
            tracker_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Build state with the mail source named in the configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let mail: Arc<dyn MailSource> = match config.mail_source {
            MailSourceKind::Gmail => Arc::new(GmailSource::new(
                &config.gmail_api_base,
                config.gmail_access_token.clone(),
            )),
            MailSourceKind::Fixture => {
                let path = config.mail_fixture_path.as_deref().ok_or_else(|| {
                    AppError::Validation("MAIL_FIXTURE_PATH is not set".to_string())
                })?;
                Arc::new(FixtureSource::from_path(path)?)
            }
        };
        Self::new(config, mail)
    }

    /// Tracker path for a request, falling back to the configured default.
    pub fn table_path(&self, requested: Option<&str>) -> PathBuf {
        requested
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.tracker_path.clone())
    }
}
