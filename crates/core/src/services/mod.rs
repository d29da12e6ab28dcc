//! Business logic services.

#![allow(missing_docs)]

pub mod analytics;
pub mod auth;
pub mod complaint;
pub mod user;

pub use analytics::{AnalyticsService, ComplaintAnalytics, Hotspot, HotspotLevel};
pub use auth::{Claims, TokenService};
pub use complaint::{
    AssignInput, CommentInput, ComplaintService, ComplaintView, CreateComplaintInput,
    UpdateComplaintInput, UserSummary,
};
pub use user::{
    CreateWardenInput, LoginInput, RegisterInput, UpdateProfileInput, UserService,
};
