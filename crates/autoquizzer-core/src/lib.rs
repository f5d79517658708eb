//! autoquizzer-core: quiz model, reply parsing, answering and scoring.
//!
//! This crate defines the data model, the collaborator traits and the
//! pipeline that turns an article into a quiz and grades a model on it.

pub mod answer;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod prompts;
pub mod repair;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod traits;
