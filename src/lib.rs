pub mod cli;
pub mod complete;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod policy;
pub mod render;
pub mod report;
pub mod sanitize;
pub mod summary;
pub mod transport;
pub mod util;
