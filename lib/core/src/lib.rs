//! Core identity types and utilities for Chip's Parlour.
//!
//! This crate provides the foundational id types, the guest id allocators,
//! and the error-handling alias shared by the rest of the workspace.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{
    GUEST_PREFIX, GUEST_SUFFIX_LEN, GuestIdAllocator, IdentityId, ParseIdError, RandomGuestIds,
    SequentialGuestIds,
};
