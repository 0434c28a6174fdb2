#![allow(clippy::doc_markdown)]

pub mod cli;
pub mod core;
pub mod fleet;
pub mod notify;
pub mod prelude;
pub mod quantity;
pub mod tables;
