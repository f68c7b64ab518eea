//! Test modules for listener registration

pub(crate) mod utils;
