//! Core business logic for minsu-connect.

pub mod services;

pub use services::*;
