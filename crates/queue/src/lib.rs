//! Background processing for the RentMate moderation service.
//!
//! - **Scheduler**: periodic sweeps (expired-lock reaper, overdue escalation)
//! - **Pub/Sub**: moderation event broadcasting over Redis

pub mod pubsub;
pub mod scheduler;

pub use pubsub::{PubSubEvent, RedisEventPublisher};
pub use scheduler::{JobExecutor, SchedulerConfig, run_scheduler};
