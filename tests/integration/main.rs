//! Integration test binary: pipeline and service runs against in-memory
//! providers and a scripted model, consolidated into a single binary.

// Allow unwrap/expect in test code
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

mod pipeline;
mod service;
