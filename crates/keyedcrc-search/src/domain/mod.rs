//! Domain layer - Pure computational logic
//!
//! This module contains pure functions and algorithms without I/O dependencies.

pub mod candidate;
pub mod checksum;
pub mod resource;
