/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Chat-platform user identifiers (Telegram ids) are 64-bit integers.
pub type ExternalId = i64;
