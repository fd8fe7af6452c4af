//! Application services for task mutation and reminder scheduling.

mod commands;
mod reminder;

pub use commands::{
    CreateTaskRequest, TaskCommandError, TaskCommandResult, TaskCommandService, UpdateTaskRequest,
};
pub use reminder::{ReminderConfig, ReminderScanner, ScanSummary};
