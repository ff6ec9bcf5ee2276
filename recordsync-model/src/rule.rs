use crate::{Record, ValidationError};

/// A cross-field check attached to a [`RecordSchema`](crate::RecordSchema).
///
/// Per-field rules cover required-ness, types, lengths and enums. Implement
/// this only for constraints that span several fields, e.g. "an image is
/// required once a caption is set".
///
/// Any `Fn(&Record) -> Vec<ValidationError>` closure is a rule.
pub trait RecordRule: Send + Sync {
    /// Returns every violation found in `record`; empty means valid.
    fn check(&self, record: &Record) -> Vec<ValidationError>;
}

impl<F> RecordRule for F
where
    F: Fn(&Record) -> Vec<ValidationError> + Send + Sync,
{
    fn check(&self, record: &Record) -> Vec<ValidationError> {
        self(record)
    }
}
