//! In-memory targets for testing.
//!
//! Available behind the `test-utils` feature flag.

mod recording_target;

pub use recording_target::RecordingTarget;
