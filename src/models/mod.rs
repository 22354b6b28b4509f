//! Data models

mod user;

pub use user::*;
