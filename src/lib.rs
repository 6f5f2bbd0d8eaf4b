pub mod types;
pub mod error;
pub mod config;
pub mod data;
pub mod processing;
pub mod reference;
pub mod render;
pub mod summary;
