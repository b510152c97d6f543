//! Core business logic for the RentMate moderation service.

pub mod services;

pub use services::*;
