//! Test suites for the notification pipeline.

mod support;
