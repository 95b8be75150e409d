//! Compiles map documents into compressed binary artifacts.

#[macro_use]
extern crate tracing;

pub mod schema;
pub mod compile;
pub mod artifact;
pub mod settings;
pub mod logging;
pub mod paths;
