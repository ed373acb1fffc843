//! Chip's Parlour web server.
//!
//! This crate provides the HTTP service in front of the identity
//! configurator: the sign-in surface, guest and OAuth sign-in, session
//! lookup, and the game catalogue.

pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
