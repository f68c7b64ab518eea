//! Test modules for listener event queues
