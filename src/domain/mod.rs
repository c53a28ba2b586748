//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click event model
//! - [`click_worker`] - Fire-and-forget click recording
//! - [`oauth`] - OAuth provider port
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves a code and builds a [`click_event::ClickEvent`]
//! 2. [`click_worker::ClickRecorder::dispatch`] enqueues it without waiting
//! 3. [`click_worker::run_click_worker`] classifies and persists it via
//!    [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod oauth;
pub mod repositories;
