/// Store-assigned primary keys for catalog rows (`dramas`, `atores`, `reviews`).
pub type DbId = i64;

/// Auth provider user identifiers are UUIDs.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
