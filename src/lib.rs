// src/lib.rs — Library root for specloop

pub mod cli;
pub mod core;
pub mod evaluator;
pub mod feedback;
pub mod generator;
pub mod infra;
pub mod memory;
pub mod provider;
pub mod util;
