#![allow(clippy::module_inception)]

pub mod constants;
pub mod deep_links;
pub mod models;
pub mod runtime;
pub mod types;
