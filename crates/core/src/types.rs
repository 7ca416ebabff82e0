/// Case identifiers are short opaque strings (`case_<hex>`).
pub type CaseId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
