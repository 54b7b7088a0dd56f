//! Ordered, first-match status classification of email text.
//!
//! Categories are scanned in insertion order and each category's patterns in
//! insertion order. The first pattern found anywhere in the text decides the
//! status; later categories never override an earlier hit.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::application::{status, ApplicationRecord};

/// Built-in categories and their patterns, in precedence order.
pub const DEFAULT_PATTERNS: [(&str, &[&str]); 4] = [
    (
        status::APPLICATION_RECEIVED,
        &[
            r"thank\s+you\s+for\s+(?:your\s+)?(?:interest|applying)",
            r"application\s+(?:has\s+been\s+)?received",
            r"we\s+have\s+received\s+your\s+application",
            r"your\s+application\s+for",
            r"application\s+confirmation",
        ],
    ),
    (
        status::REJECTION,
        &[
            r"unfortunately",
            r"we\s+regret\s+to\s+inform",
            r"after\s+careful\s+consideration",
            r"we\s+have\s+decided\s+to\s+move\s+forward\s+with\s+other",
            r"not\s+selected\s+for\s+(?:this\s+)?position",
            r"we\s+will\s+not\s+be\s+moving\s+forward",
            r"position\s+has\s+been\s+filled",
        ],
    ),
    (
        status::INTERVIEW,
        &[
            r"interview",
            r"schedule\s+(?:a\s+)?(?:call|meeting)",
            r"next\s+(?:step|round)",
            r"would\s+like\s+to\s+(?:speak|talk)\s+with\s+you",
            r"phone\s+(?:screen|call)",
            r"video\s+(?:call|interview)",
        ],
    ),
    (
        status::OFFER,
        &[
            r"pleased\s+to\s+(?:offer|extend)",
            r"job\s+offer",
            r"offer\s+of\s+employment",
            r"congratulations",
            r"we\s+would\s+like\s+to\s+offer\s+you",
        ],
    ),
];

/// A compiled pattern, keeping its source text for reporting.
#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    regex: Regex,
}

#[derive(Debug, Clone)]
struct Category {
    name: String,
    patterns: Vec<CompiledPattern>,
}

/// Category listing returned to callers, in precedence order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInfo {
    pub name: String,
    pub patterns: Vec<String>,
}

/// Regex-based status classifier with a runtime-extensible category list.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    categories: Vec<Category>,
}

impl StatusClassifier {
    /// Classifier with no categories; every text classifies as `unknown`.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Classifier seeded with the built-in category set.
    pub fn with_defaults() -> Result<Self, AppError> {
        let mut classifier = Self::empty();
        for (category, patterns) in DEFAULT_PATTERNS {
            for pattern in patterns {
                classifier.push_pattern(category, pattern)?;
            }
        }
        Ok(classifier)
    }

    /// Status of the first pattern matching `"{subject} {body}"`, or `unknown`.
    pub fn classify(&self, subject: &str, body: &str) -> String {
        let content = format!("{subject} {body}").to_lowercase();

        let hit = self
            .categories
            .iter()
            .flat_map(|c| c.patterns.iter().map(move |p| (c, p)))
            .find(|(_, p)| p.regex.is_match(&content));

        match hit {
            Some((category, pattern)) => {
                tracing::debug!(
                    category = %category.name,
                    pattern = %pattern.source,
                    "Email classified"
                );
                category.name.clone()
            }
            None => {
                tracing::debug!("Email could not be classified");
                status::UNKNOWN.to_string()
            }
        }
    }

    /// Set each record's status in place, preserving order.
    pub fn classify_batch(&self, records: &mut [ApplicationRecord]) {
        for record in records.iter_mut() {
            record.status = self.classify(&record.subject, &record.body);
        }
    }

    /// Append a pattern to `category`, creating the category at lowest
    /// precedence if it does not exist yet.
    pub fn add_pattern(&mut self, category: &str, pattern: &str) -> Result<(), AppError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::Validation("category must not be empty".to_string()));
        }
        if pattern.is_empty() {
            return Err(AppError::Validation("pattern must not be empty".to_string()));
        }
        self.push_pattern(category, pattern)?;
        tracing::info!(category, pattern, "Added classification pattern");
        Ok(())
    }

    /// Categories and their pattern sources, in precedence order.
    pub fn categories(&self) -> Vec<CategoryInfo> {
        self.categories
            .iter()
            .map(|c| CategoryInfo {
                name: c.name.clone(),
                patterns: c.patterns.iter().map(|p| p.source.clone()).collect(),
            })
            .collect()
    }

    fn push_pattern(&mut self, category: &str, pattern: &str) -> Result<(), AppError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::Validation(format!("Invalid pattern '{pattern}': {e}")))?;
        let compiled = CompiledPattern {
            source: pattern.to_string(),
            regex,
        };

        match self.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.patterns.push(compiled),
            None => self.categories.push(Category {
                name: category.to_string(),
                patterns: vec![compiled],
            }),
        }
        Ok(())
    }
}
