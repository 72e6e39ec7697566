//! Shared helpers for binaries and step libraries.

pub mod bootstrap;
