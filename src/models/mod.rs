pub mod common;
pub mod ctx;
