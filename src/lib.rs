//! Discord bot that reports whether a local game server is up.

pub mod bot;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod probe;
pub mod status;

pub use bot::run;
