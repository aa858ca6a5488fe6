#![doc = include_str!("../README.md")]

pub mod backend;
pub mod error;
pub mod file;

pub use backend::{Backend, FeOxDb, Moka, ValueFormat, ValueSerialization};
pub use error::ConfigError;
pub use file::{Bypass, ConfigFile, Generation, Offload, OnTimeout};
