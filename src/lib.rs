//! sweep-runner: launch hyperparameter sweeps through an external experiment tracker
//!
//! The tracker owns the search. This crate loads the sweep definition, merges each
//! trial's suggested parameters into a base training configuration by dotted path,
//! makes sure the tracker's logging integration is enabled, and runs the trainer.

pub mod cli;
pub mod config;
pub mod domain;
pub mod merge;
pub mod sweep;
pub mod tracker;
pub mod trial;
pub mod utils;
