//! TaskMaster: a single-page task dashboard.
//!
//! Owners add tasks with a priority and a due date, see headline counts, a
//! status chart and upcoming deadlines, and edit or delete tasks inline.
//! All state lives in the store; every action is followed by a full
//! re-render from freshly fetched data.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod view;
