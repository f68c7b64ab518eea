//! CLI module containing argument parsing

pub mod args;

pub use args::Args;
