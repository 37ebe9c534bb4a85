mod provider;

pub mod chain;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod model;
pub mod reasoning;
pub mod sink;

#[cfg(test)]
mod test_utils;

pub use crate::provider::llm::{get_reasoner, get_responder};
