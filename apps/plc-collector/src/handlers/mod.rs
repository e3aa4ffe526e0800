//! Handlers 模块

pub mod collection;
pub mod config;
pub mod devices;
pub mod health;
pub mod metrics;
pub mod read_logs;
pub mod registers;

pub use collection::*;
pub use config::*;
pub use devices::*;
pub use health::*;
pub use metrics::*;
pub use read_logs::*;
pub use registers::*;
