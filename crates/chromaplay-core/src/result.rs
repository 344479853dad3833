// ── Uniform call result ──

use std::fmt::Display;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, FailureKind};

/// Success/failure/timing envelope returned by every client operation.
///
/// `data` is meaningful only when `success` is true, `error` only when it
/// is false. `duration` is wall-clock milliseconds and is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration: u64,
    /// HTTP status of a failure the server answered. Not part of the
    /// serialized envelope.
    #[serde(skip)]
    pub status: Option<u16>,
    /// Classification of a failure raised by the client. Not serialized.
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl<T> ApiResult<T> {
    pub fn ok(data: T, elapsed: Duration) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            duration: millis(elapsed),
            status: None,
            failure: None,
        }
    }

    pub fn err(error: impl Display, elapsed: Duration) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            duration: millis(elapsed),
            status: None,
            failure: None,
        }
    }

    /// Failure that was detected before any work started.
    pub fn failed_immediately(error: impl Display) -> Self {
        Self::err(error, Duration::ZERO)
    }

    /// Classified failure raised before any request was sent.
    pub fn rejected(error: &CoreError) -> Self {
        Self::from_error(error, Duration::ZERO)
    }

    /// Classified failure for `error`, taking `elapsed` time.
    pub fn from_error(error: &CoreError, elapsed: Duration) -> Self {
        Self {
            status: error.status(),
            failure: Some(error.kind()),
            ..Self::err(error, elapsed)
        }
    }

    pub(crate) fn from_outcome(outcome: Result<T, CoreError>, started: Instant) -> Self {
        let elapsed = started.elapsed();
        match outcome {
            Ok(data) => Self::ok(data, elapsed),
            Err(e) => Self::from_error(&e, elapsed),
        }
    }

    /// Like `from_outcome`, but `Ok(None)` is a success with no payload.
    pub(crate) fn from_optional(outcome: Result<Option<T>, CoreError>, started: Instant) -> Self {
        match outcome {
            Ok(Some(data)) => Self::from_outcome(Ok(data), started),
            Ok(None) => Self::ok_empty(started.elapsed()),
            Err(e) => Self::from_outcome(Err(e), started),
        }
    }

    fn ok_empty(elapsed: Duration) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            duration: millis(elapsed),
            status: None,
            failure: None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            duration: self.duration,
            status: self.status,
            failure: self.failure,
        }
    }
}

impl<T: Serialize> ApiResult<T> {
    /// Erase the payload type for generic dispatch and display.
    pub fn into_json(self) -> ApiResult<Value> {
        match self.data.map(serde_json::to_value) {
            Some(Err(e)) => ApiResult {
                success: false,
                data: None,
                error: Some(format!("Failed to encode response: {e}")),
                duration: self.duration,
                status: None,
                failure: Some(FailureKind::Internal),
            },
            Some(Ok(value)) => ApiResult {
                success: self.success,
                data: Some(value),
                error: self.error,
                duration: self.duration,
                status: self.status,
                failure: self.failure,
            },
            None => ApiResult {
                success: self.success,
                data: None,
                error: self.error,
                duration: self.duration,
                status: self.status,
                failure: self.failure,
            },
        }
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
