use std::time::Duration;

use metrics::{counter, histogram};

/// Total persistence operations, labelled by operation and status.
pub const DB_OPERATIONS_TOTAL: &str = "agenda_db_operations_total";
/// Persistence operation latency in seconds.
pub const DB_OPERATION_DURATION: &str = "agenda_db_operation_duration_seconds";
/// Failures, labelled by error type and operation.
pub const ERRORS_TOTAL: &str = "agenda_errors_total";
/// Contacts written to export files.
pub const CONTACTS_EXPORTED_TOTAL: &str = "agenda_contacts_exported_total";

/// Metrics collection and management
///
/// Records through the `metrics` facade. Nothing is exported unless the
/// embedding program installs a recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCollector;

impl MetricsCollector {
    /// Record database operation metrics
    pub fn record_db_operation(&self, operation: &'static str, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };

        counter!(DB_OPERATIONS_TOTAL, "operation" => operation, "status" => status).increment(1);
        histogram!(DB_OPERATION_DURATION, "operation" => operation).record(duration.as_secs_f64());

        if !success {
            self.record_error("database", operation);
        }
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &'static str, operation: &'static str) {
        counter!(ERRORS_TOTAL, "type" => error_type, "operation" => operation).increment(1);
    }

    /// Record exported contacts
    pub fn record_export(&self, count: usize, format: &'static str) {
        counter!(CONTACTS_EXPORTED_TOTAL, "format" => format).increment(count as u64);
    }
}
