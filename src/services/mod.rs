//! Business logic services.

pub mod classifier;
pub mod ingestion;
pub mod mail;
pub mod summary;
pub mod tracker;
