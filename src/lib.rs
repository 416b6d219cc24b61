pub mod aggregate;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod plots;
pub mod publish;
pub mod report;
pub mod store;
pub mod util;
