//! Domain model and pure transformations for the SkillTrack client.
//!
//! Everything in this crate is synchronous and side-effect free: network and
//! logging live in the `gateway` and `services` crates.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod model;
pub mod payload;
pub mod roster;
pub mod time;

pub use error::ValidationError;
pub use filter::{StatusFilter, filter_courses, filter_skills, filter_students};
pub use roster::{RosterBuilder, merge_student_roster};
pub use time::Clock;
