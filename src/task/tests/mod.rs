//! Test suites for the task module.

mod command_tests;
mod reminder_tests;
mod support;
