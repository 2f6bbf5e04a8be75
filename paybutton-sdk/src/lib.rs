//! Shared objects for the paybutton payment request widget.
//!
//! Everything that crosses a boundary lives here: the shapes returned by the
//! price feed, token metadata and unconfirmed-transaction collaborators, the
//! payload handed to an injected wallet provider, and the payment URI used
//! for QR codes. The optional `client` feature adds a typed HTTP client for
//! the collaborator endpoints.

#![forbid(unsafe_code)]

pub mod config;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;
