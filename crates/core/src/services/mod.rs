//! Business logic services.

#![allow(missing_docs)]

pub mod escalation;
pub mod event_publisher;
pub mod rental;
pub mod report;
pub mod user;

pub use escalation::EscalationService;
pub use event_publisher::{NoOpEventPublisher, ReportEventPublisher, ReportEventPublisherService};
pub use rental::{HttpRentalClient, Rental, RentalClient};
pub use report::{CreateReportInput, ReportPage, ReportService, ResolveOutcome};
pub use user::UserService;
