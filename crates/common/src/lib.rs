//! Common utilities and types shared across coffee shop components.

#![warn(clippy::pedantic)]

/// Module for JWT utilities (header inspection, size limits, key-type checks)
pub mod jwt;
