//! Core business logic for the hostel complaint desk.
//!
//! The lifecycle, priority and assignment modules are pure functions over
//! [`hostel_db::entities::complaint::Model`]; the services load, apply and
//! persist.

pub mod assignment;
pub mod lifecycle;
pub mod priority;
pub mod services;
pub mod triage;

pub use services::*;
