//! Screen state for SkillTrack: plain view-models over the services layer.
//!
//! Each loader turns a service call into a [`ViewState`]; the view-models
//! own search, filter and selection state and produce display rows.
#![forbid(unsafe_code)]

pub mod state;
pub mod vm;

pub use state::{EmptyState, ViewError, ViewState};
