pub mod cache;
pub mod cmd;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod fence;
pub mod infra;
pub mod inline;
pub mod render;
pub mod services;
pub mod workflow;

#[cfg(test)]
mod test_support;
