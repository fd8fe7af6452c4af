//! Test suites for the audit trail.
