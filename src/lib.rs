pub mod api;
pub mod cache;
pub mod cli;
pub mod client;
pub mod clock;
pub mod collections;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod notifications;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod ui;

pub use client::{ClientSettings, MovieClient};
pub use error::{Result, SyncError};
