pub mod cli;
pub mod command;
pub mod config;
pub mod discovery;
pub mod model;
pub mod resolver;
pub mod vcs;

mod api;

pub use api::{Repofetch, RepofetchBuilder};
