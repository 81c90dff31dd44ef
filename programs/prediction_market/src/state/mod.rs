//! State structures for the market engine

pub mod config;
pub mod market;
pub mod pool;
pub mod vault;

pub use config::*;
pub use market::*;
pub use pool::*;
pub use vault::*;
