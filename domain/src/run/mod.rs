//! Response runs.
//!
//! - [`entities::ResponseState`]: one owner's attempt at one blueprint
//! - [`lifecycle`]: answer recording, completion detection, resumption position
//! - [`cursor::RunCursor`]: index-based navigation (never persisted)
//! - [`focus::FocusState`]: post-completion focus annotation (rank or points)

pub mod cursor;
pub mod entities;
pub mod focus;
pub mod lifecycle;
