//! grievance-core: the auto-assignment decision engine of the grievance desk.
//!
//! Keyword classification, duplicate detection, department scoring, and the
//! approval workflow over the auto-assignment queue with its audit trail.

pub mod analytics;
pub mod assignment;
pub mod categorizer;
pub mod classifier;
pub mod clock;
pub mod complaint;
pub mod config;
pub mod desk;
pub mod duplicate;
pub mod error;
pub mod intake;
pub mod keywords;
pub mod queue;
pub mod store;
pub mod types;
pub mod workflow;

pub use desk::GrievanceDesk;
pub use error::{DeskError, DeskResult};
