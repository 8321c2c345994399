//! Token format, identity parsing and configuration shared by the useradm
//! test harness crates.

#![warn(clippy::pedantic)]

/// Module for harness configuration
pub mod config;

/// Module for identity extraction from bearer tokens
pub mod identity;

/// Module for token decoding (claims, constants, decompose)
pub mod jwt;

/// Module for secret types that prevent accidental logging
pub mod secret;
