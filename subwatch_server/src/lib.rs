//! # SubWatch Server Library
//!
//! Shared types, application state, and route handlers for the SubWatch
//! REST API.
//!
//! Separated from `main.rs` so that handlers can be unit-tested without
//! starting a real TCP listener.

pub mod error;
pub mod handlers;
pub mod state;
pub mod types;
