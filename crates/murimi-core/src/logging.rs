//! Structured logging schema for murimi.
//!
//! This module is the field-name contract for structured log events across
//! the workspace. The `tracing` macros require literal field names, so call
//! sites inline these names (`subsystem = "db"`, `op = "insert"`, ...) rather
//! than referencing the constants; the constants document the canonical
//! spelling for log aggregation queries and keep the schema reviewable in one
//! place. A field name used at a call site that is missing here should be
//! added here.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-row iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request. Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "analytics", "storage"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "members", "rollup", "export"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "list", "insert", "reduce", "upload"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Member UUID being operated on.
pub const MEMBER_ID: &str = "member_id";

/// Cluster leader UUID being operated on.
pub const LEADER_ID: &str = "leader_id";

/// Cluster name key involved in a join or conflict.
pub const CLUSTER: &str = "cluster";

/// Event UUID being operated on.
pub const EVENT_ID: &str = "event_id";

/// Soil sample UUID being operated on.
pub const SAMPLE_ID: &str = "sample_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned by a query or included in an aggregation pass.
pub const ROW_COUNT: &str = "row_count";

/// Number of columns selected for an export.
pub const FIELD_COUNT: &str = "field_count";

/// Byte length of a produced export document.
pub const EXPORT_BYTES: &str = "export_bytes";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
