//! Capability domain module
//!
//! A *capability* is a named unit of work an agent performs. Every invocation
//! passes through a fixed sequence of gates before and after the capability
//! body runs:
//!
//! ```text
//! CapabilityRequest
//!   │
//!   ├─ 1. existence     registry lookup            → CapabilityNotFound
//!   ├─ 2. timestamp     start_utc + monotonic clock
//!   ├─ 3. precondition  GatePolicy table           → PreconditionValidation
//!   ├─ 4. approval      GatePolicy table + human   → HumanApprovalDenied
//!   ├─ 5. parameter     Capability::validate_params → InvalidParameter
//!   ├─ 6. execution     Capability::execute        → CapabilityExecution / Timeout
//!   └─ 7. completion    end_utc, duration, compliance flag
//!   │
//! CapabilityResponse
//! ```
//!
//! This module holds the pure parts: the [`Capability`] contract, the
//! [`CapabilityRegistry`], the [`GatePolicy`] tables and the request/response
//! value objects. The asynchronous pipeline that drives the gates lives in
//! the application layer (`GatePipeline`).

pub mod error;
pub mod gate;
pub mod policy;
pub mod precondition;
pub mod registry;
pub mod traits;
pub mod value_objects;

pub use error::CapabilityError;
pub use gate::{GateKind, GateOutcome};
pub use policy::{GatePolicy, Precondition};
pub use precondition::UserStory;
pub use registry::{CapabilityRegistry, RegisteredCapability};
pub use traits::Capability;
pub use value_objects::{
    CapabilityRequest, CapabilityResponse, FieldMap, RequestId, ResponseMetadata, ResponseStatus,
};
