//! Domain models for TaskMaster.
//!
//! There is a single entity, [`Task`], partitioned by a free-text owner name.
//! [`TaskStatus`] and [`TaskPriority`] are closed enumerations whose display
//! labels double as their stored and form representations.

mod task;

pub use task::*;
