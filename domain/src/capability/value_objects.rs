//! Capability value objects: the request and response of one invocation.
//!
//! A [`CapabilityRequest`] is built once per invocation and never mutated.
//! The pipeline answers every request with exactly one [`CapabilityResponse`],
//! whether the body ran or a gate rejected it.

use super::error::CapabilityError;
use super::gate::GateKind;
use crate::core::error::ErrorKind;
use crate::core::id::next_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mapping of named fields used for parameters, results and phase state.
///
/// Backed by `serde_json::Map`, which keeps keys sorted, so serialized
/// hand-off packages are deterministic.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Correlation id of a capability request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(next_id("req"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An invocation of `capability.method(params)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRequest {
    pub capability: String,
    pub method: String,
    pub params: FieldMap,
    pub request_id: RequestId,
    /// Upper bound on capability-body execution time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl CapabilityRequest {
    pub fn new(capability: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            method: method.into(),
            params: FieldMap::new(),
            request_id: RequestId::generate(),
            timeout: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: FieldMap) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = id;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `capability.method`, used in logs, errors and approval prompts.
    pub fn operation_name(&self) -> String {
        format!("{}.{}", self.capability, self.method)
    }
}

/// Outcome class of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
    Timeout,
}

/// Timing and gate trace attached to every response.
///
/// `start_utc` is absent only when the existence gate rejected the request,
/// because the timestamp gate had not run yet. Once present,
/// `end_utc - start_utc` equals `duration_ms` (millisecond resolution).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Gates that let the request through, in evaluation order
    #[serde(default)]
    pub gates_passed: Vec<GateKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_gate: Option<GateKind>,
    /// Set only when the approval gate asked a human
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_approved: Option<bool>,
    #[serde(default)]
    pub completion_recorded: bool,
}

impl ResponseMetadata {
    /// Stamp the end of the request from a start instant and elapsed time.
    ///
    /// `end_utc` is derived from the monotonic elapsed duration rather than a
    /// second wall-clock read, so it can never precede `start_utc`.
    pub fn finish(&mut self, elapsed: Duration) {
        if let Some(start) = self.start_utc {
            let delta = chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero());
            self.end_utc = Some(start + delta);
            self.duration_ms = Some(elapsed.as_millis() as u64);
        }
    }

    pub fn pass(&mut self, gate: GateKind) {
        self.gates_passed.push(gate);
    }
}

/// Response to a [`CapabilityRequest`]. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityResponse {
    pub request_id: RequestId,
    pub status: ResponseStatus,
    /// Capability output, or `error` / `error_code` entries on failure
    pub result: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CapabilityError>,
    pub metadata: ResponseMetadata,
    pub execution_time: Duration,
}

impl CapabilityResponse {
    pub fn success(
        request_id: RequestId,
        result: FieldMap,
        metadata: ResponseMetadata,
        execution_time: Duration,
    ) -> Self {
        Self {
            request_id,
            status: ResponseStatus::Success,
            result,
            error: None,
            metadata,
            execution_time,
        }
    }

    pub fn failure(
        request_id: RequestId,
        error: CapabilityError,
        metadata: ResponseMetadata,
        execution_time: Duration,
    ) -> Self {
        let status = match error.kind() {
            ErrorKind::Timeout => ResponseStatus::Timeout,
            _ => ResponseStatus::Error,
        };
        let mut result = FieldMap::new();
        result.insert("error".into(), error.to_string().into());
        result.insert("error_code".into(), error.code().into());
        Self {
            request_id,
            status,
            result,
            error: Some(error),
            metadata,
            execution_time,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind())
    }
}
