//! Rendering collaborators: they read `SessionState` and the last
//! evaluation, and call back into the session when an input changes.

pub mod dashboard;
pub mod panels;
pub mod plot;
pub mod summary;
pub mod table;
