//! Domain models shared by the parsers, services, and routes.

pub mod application;
pub mod email;
pub mod table;
