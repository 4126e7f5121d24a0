//! Support code for the `vidthumb` binary.

pub mod config;

pub use config::Config;
