//! Database entities.

pub mod complaint;
pub mod user;

pub use complaint::Entity as Complaint;
pub use user::Entity as User;
