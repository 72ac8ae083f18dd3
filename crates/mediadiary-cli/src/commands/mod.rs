//! Command handlers, one module per command group.

pub mod auth;
pub mod browse;
pub mod chart;
pub mod diary;
pub mod facets;
pub mod init;
pub mod misc;
pub mod prefs;
