//! shutterpost library crate.
//!
//! Exposes the capture client's components for integration testing.

pub mod camera;
pub mod config;
pub mod gallery;
pub mod render;
pub mod session;
pub mod webhook;
