//! Thin per-resource facades over [`Client::send`](crate::Client::send).
//!
//! Each facade borrows the client, builds an [`Endpoint`](crate::Endpoint)
//! for its collection and returns whatever the pipeline produces. None of
//! them add error handling of their own.

mod projects;
mod statuses;
mod types;
mod work_packages;

pub use projects::Projects;
pub use statuses::Statuses;
pub use types::Types;
pub use work_packages::WorkPackages;
