//! Phase domain module
//!
//! A *phase* is an ordered list of steps, each bound to one capability of one
//! agent. Steps consume fields of the accumulated [`PhaseOutput`] and merge
//! their declared outputs back into it. The first failed step aborts the
//! phase; otherwise a final pass checks the required outputs.

pub mod confidence;
pub mod definition;
pub mod output;
pub mod result;
pub mod review;
pub mod run;
pub mod step;

pub use confidence::{ConfidenceInputs, ConfidenceWeights, clamp_confidence, mean_confidence};
pub use definition::{PhaseConfigError, PhaseDefinition};
pub use output::{PhaseOutput, StepLedger, is_populated};
pub use result::{StepError, StepOutcome, StepResult};
pub use review::{DEFAULT_REVIEW_THRESHOLD, ReviewPolicy};
pub use run::{PhaseRun, PhaseRunResult, PhaseStatus, StepDisposition};
pub use step::{StepDefinition, StepId};
