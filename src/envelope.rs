use serde::ser::SerializeStruct;

use crate::catalog::{ErrorCode, ErrorRecord, render};
use crate::types::AdditionalInformation;

/// Replies of `contact.addList`.
pub const ASSOCIATION_OUTCOMES: &[(i64, &str)] =
    &[(0, "Already associated"), (1, "Successfully associated")];

/// Replies of `contact.import`.
pub const IMPORT_OUTCOMES: &[(i64, &str)] = &[(1, "Import request received.")];

/// Uniform result of every client operation.
///
/// Serializes as `{"success": bool, "results": [...]}`. A failure always carries
/// exactly one [`ErrorRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(Vec<T>),
    Failure(ErrorRecord),
}

impl<T> Envelope<T> {
    pub fn success(results: Vec<T>) -> Self {
        Self::Success(results)
    }

    pub fn single(result: T) -> Self {
        Self::Success(vec![result])
    }

    pub fn failure(record: ErrorRecord) -> Self {
        Self::Failure(record)
    }

    /// Failure detected by the client before any remote call was made.
    pub fn local_failure(code: ErrorCode, info: impl Into<AdditionalInformation>) -> Self {
        Self::Failure(render(code, Some(&info.into())))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Successful payloads; empty for a failure.
    pub fn results(&self) -> &[T] {
        match self {
            Self::Success(results) => results,
            Self::Failure(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Success(_) => None,
            Self::Failure(record) => Some(record),
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.results().first()
    }

    /// Run the next step of a multi-step operation on the first result.
    ///
    /// A failure is handed back unchanged and `next` is never called. An empty
    /// success stays an empty success.
    pub fn and_then_first<U>(self, next: impl FnOnce(T) -> Envelope<U>) -> Envelope<U> {
        match self {
            Self::Success(results) => match results.into_iter().next() {
                Some(first) => next(first),
                None => Envelope::Success(Vec::new()),
            },
            Self::Failure(record) => Envelope::Failure(record),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Envelope<U> {
        match self {
            Self::Success(results) => Envelope::Success(results.into_iter().map(f).collect()),
            Self::Failure(record) => Envelope::Failure(record),
        }
    }

    pub fn into_result(self) -> Result<Vec<T>, ErrorRecord> {
        match self {
            Self::Success(results) => Ok(results),
            Self::Failure(record) => Err(record),
        }
    }
}

impl<T> From<Result<Vec<T>, ErrorRecord>> for Envelope<T> {
    fn from(result: Result<Vec<T>, ErrorRecord>) -> Self {
        match result {
            Ok(results) => Self::Success(results),
            Err(record) => Self::Failure(record),
        }
    }
}

impl<T: serde::Serialize> serde::Serialize for Envelope<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 2)?;
        state.serialize_field("success", &self.is_success())?;
        match self {
            Self::Success(results) => state.serialize_field("results", results)?,
            Self::Failure(record) => {
                state.serialize_field("results", std::slice::from_ref(record))?;
            }
        }
        state.end()
    }
}

/// Map an enumerated remote reply to its message.
///
/// Booleans count as 0/1. A reply outside `outcomes` is an unknown error carrying
/// the reply itself.
pub fn interpret_reply(
    reply: &serde_json::Value,
    outcomes: &[(i64, &'static str)],
) -> Result<&'static str, ErrorRecord> {
    let value = reply.as_i64().or_else(|| reply.as_bool().map(i64::from));
    value
        .and_then(|v| outcomes.iter().find(|(expected, _)| *expected == v))
        .map(|(_, message)| *message)
        .ok_or_else(|| {
            tracing::warn!(%reply, "unexpected remote reply");
            render(
                ErrorCode::Unknown,
                Some(&AdditionalInformation::Values(vec![reply.clone()])),
            )
        })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failure_serializes_with_single_record() {
        let envelope: Envelope<i64> =
            Envelope::local_failure(ErrorCode::InvalidListId, "Input value: -4");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "results": [{"code": 4402, "message": "Invalid list id. Input value: -4."}]
            })
        );
    }

    #[test]
    fn success_serializes_all_results() {
        let envelope = Envelope::success(vec![1, 2, 10]);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            serde_json::json!({"success": true, "results": [1, 2, 10]})
        );
        let empty: Envelope<i64> = Envelope::success(Vec::new());
        assert_eq!(
            serde_json::to_value(&empty).unwrap(),
            serde_json::json!({"success": true, "results": []})
        );
    }

    #[test]
    fn failed_step_short_circuits() {
        let called = Cell::new(false);
        let first: Envelope<i64> = Envelope::local_failure(ErrorCode::MissingEmailField, "x");
        let expected = first.error().cloned();

        let chained: Envelope<String> = first.and_then_first(|id| {
            called.set(true);
            Envelope::single(id.to_string())
        });

        assert!(!called.get());
        assert_eq!(chained.error().cloned(), expected);
    }

    #[test]
    fn successful_step_feeds_first_result_forward() {
        let chained = Envelope::success(vec![7_i64, 8]).and_then_first(|id| Envelope::single(id * 2));
        assert_eq!(chained, Envelope::single(14));
    }

    #[test]
    fn empty_success_does_not_run_next_step() {
        let chained: Envelope<i64> =
            Envelope::<i64>::success(Vec::new()).and_then_first(|_| Envelope::single(1));
        assert_eq!(chained, Envelope::success(Vec::new()));
    }

    #[test]
    fn accessors_and_conversions() {
        let ok = Envelope::single("a");
        assert!(ok.is_success());
        assert_eq!(ok.first(), Some(&"a"));
        assert_eq!(ok.error(), None);
        assert_eq!(ok.clone().map(str::len), Envelope::single(1));
        assert_eq!(ok.into_result().unwrap(), vec!["a"]);

        let err: Envelope<&str> = Envelope::local_failure(ErrorCode::InvalidContactId, "0");
        assert!(err.results().is_empty());
        let record = err.clone().into_result().unwrap_err();
        assert_eq!(Envelope::from(Err::<Vec<&str>, _>(record)), err);
    }

    #[test]
    fn interpret_reply_maps_enumerated_values() {
        assert_eq!(
            interpret_reply(&serde_json::json!(0), ASSOCIATION_OUTCOMES),
            Ok("Already associated")
        );
        assert_eq!(
            interpret_reply(&serde_json::json!(1), ASSOCIATION_OUTCOMES),
            Ok("Successfully associated")
        );
        assert_eq!(
            interpret_reply(&serde_json::json!(true), ASSOCIATION_OUTCOMES),
            Ok("Successfully associated")
        );
        assert_eq!(
            interpret_reply(&serde_json::json!(1), IMPORT_OUTCOMES),
            Ok("Import request received.")
        );
    }

    #[test]
    fn interpret_reply_rejects_unexpected_values() {
        let record = interpret_reply(&serde_json::json!(5), ASSOCIATION_OUTCOMES).unwrap_err();
        assert_eq!(record.code, ErrorCode::Unknown);
        assert_eq!(
            record.message,
            "Unknown error. Did not recognise fault code or error message. 5."
        );

        let record = interpret_reply(&serde_json::json!(0), IMPORT_OUTCOMES).unwrap_err();
        assert_eq!(record.code, ErrorCode::Unknown);

        let record = interpret_reply(&serde_json::json!("yes"), ASSOCIATION_OUTCOMES).unwrap_err();
        assert!(record.message.ends_with(" yes."));
    }
}
