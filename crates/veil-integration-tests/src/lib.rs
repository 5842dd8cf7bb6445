//! Integration test crate for the Veil OPRF.
//!
//! This crate has no library code. It only contains integration tests that
//! run the client and server halves of the protocol against each other,
//! exchanging only the canonical wire encodings.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p veil-integration-tests
//! ```
