//! Study, session and join operations.
//!
//! Every operation takes the database connection explicitly; nothing here
//! holds global state.

pub mod join;
pub mod sessions;
pub mod studies;
