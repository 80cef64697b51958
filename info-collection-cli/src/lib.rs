//! info-collection CLI library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod fixtures;

pub use fixtures::{load_collections, load_config, load_contents, load_event};
