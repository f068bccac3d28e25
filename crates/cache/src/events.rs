use crate::models::ContentField;

/// Change notification published by the [`Repository`](crate::Repository).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Derived content of these paths was written.
    Updated(Vec<String>),
    /// One field was nulled across every record.
    Cleared(ContentField),
    /// Records were deleted.
    Removed(Vec<String>),
    Renamed { from: String, to: String },
}
