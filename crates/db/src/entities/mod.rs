//! Database entities.

pub mod report;
pub mod user;

pub use report::Entity as UserReport;
pub use user::Entity as User;
