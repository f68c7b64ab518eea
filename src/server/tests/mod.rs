//! Test modules for the remote cache server

mod helpers;
