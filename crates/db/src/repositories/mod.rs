//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod dance_repo;
pub mod program_dance_repo;
pub mod program_repo;

pub use dance_repo::DanceRepo;
pub use program_dance_repo::ProgramDanceRepo;
pub use program_repo::ProgramRepo;
