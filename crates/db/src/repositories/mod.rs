//! Database repositories.

pub mod report;
pub mod user;

pub use report::{ReportQuery, ReportRepository};
pub use user::UserRepository;
