//! The capability contract.

use super::value_objects::FieldMap;
use async_trait::async_trait;

/// A named unit of work an agent can perform.
///
/// Implementations must not return `Err` for expected business failures;
/// those belong inside the result map (for example an `errors` array).
/// `Err` and panics are treated as unexpected and wrapped by the gate
/// pipeline as execution errors.
///
/// # Example
///
/// ```ignore
/// struct Echo;
///
/// #[async_trait]
/// impl Capability for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn supported_methods(&self) -> Vec<String> { vec!["say".into()] }
///     fn validate_params(&self, _method: &str, params: &FieldMap) -> Result<(), String> {
///         params.get("text").map(|_| ()).ok_or_else(|| "missing 'text'".into())
///     }
///     async fn execute(&self, _method: &str, params: &FieldMap) -> Result<FieldMap, String> {
///         Ok(params.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique name within one registry.
    fn name(&self) -> &str;

    /// Methods this capability answers. Read once, at registration.
    fn supported_methods(&self) -> Vec<String>;

    /// Check `params` for `method` without side effects.
    fn validate_params(&self, method: &str, params: &FieldMap) -> Result<(), String>;

    /// Run `method`. May suspend; must not be called before validation.
    async fn execute(&self, method: &str, params: &FieldMap) -> Result<FieldMap, String>;
}
