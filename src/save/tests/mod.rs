//! Scenario tests for the auto-save controller.
//!
//! All tests run on a paused tokio clock inside a `LocalSet`, so timer
//! deadlines are hit exactly and the runtime auto-advances when idle.

mod support;
