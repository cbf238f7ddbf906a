pub mod cli;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod spec;
pub mod sql;
pub mod types;
