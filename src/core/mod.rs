// src/core/mod.rs — Core iteration engine

pub mod cost;
pub mod orchestrator;
pub mod outcome;
pub mod reward;
pub mod session;
pub mod types;
