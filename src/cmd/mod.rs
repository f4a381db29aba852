pub mod config;
pub mod insert;
pub mod render;
pub mod scan;
