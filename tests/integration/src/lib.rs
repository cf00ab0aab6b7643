//! Integration test utilities for the client stack
//!
//! Provides entity fixtures, a scripted in-process API transport, and a
//! minimal loopback HTTP backend for exercising the real transport.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
