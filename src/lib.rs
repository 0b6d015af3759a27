pub mod analytics;
pub mod config;
pub mod model;
pub mod output;
pub mod parser;
pub mod simulate;
pub mod store;
