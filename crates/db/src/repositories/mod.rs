//! Repositories wrapping database access for each entity.

mod complaint;
mod user;

pub use complaint::{
    BlockCount, CategoryCount, ComplaintRepository, HotspotCount, ResolutionSpan, StatusCount,
};
pub use user::UserRepository;
