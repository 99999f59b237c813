//! Wire types shared by the match server and its clients

pub mod protocol;
pub mod time_control;

pub use time_control::{TimeControl, UnknownTimeControl};
