//! Architect: a layered component design over the domain model.

use super::domain_modeler::requirement_texts;
use super::{check, require_present, string_list, unsupported};
use async_trait::async_trait;
use relay_domain::{Capability, FieldMap};
use serde_json::{Value, json};

const LAYERS: [&str; 4] = ["presentation", "application", "domain", "infrastructure"];

pub struct Architect;

impl Architect {
    fn design_architecture(&self, params: &FieldMap) -> Result<FieldMap, String> {
        let requirements = requirement_texts(params.get("requirements"));
        let constraints = string_list(params.get("constraints"));
        let entities: Vec<String> = params
            .get("domain_model")
            .and_then(|model| model.get("entities"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|e| e.get("name")?.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let style = architecture_style(&constraints);
        let components: Vec<Value> = entities
            .iter()
            .flat_map(|entity| {
                [
                    json!({ "name": format!("{}Service", entity), "layer": "application", "entity": entity }),
                    json!({ "name": entity, "layer": "domain", "entity": entity }),
                    json!({ "name": format!("{}Repository", entity), "layer": "infrastructure", "entity": entity }),
                ]
            })
            .collect();

        let mut decisions = vec![format!(
            "Use a {} architecture with {} layers",
            style,
            LAYERS.len()
        )];
        decisions.extend(constraints.iter().map(|c| format!("Honour constraint: {}", c)));

        let mut out = FieldMap::new();
        out.insert(
            "checks".into(),
            json!([
                check("has_components", !components.is_empty()),
                check("requirements_considered", !requirements.is_empty()),
            ]),
        );
        out.insert(
            "architecture".into(),
            json!({
                "style": style,
                "layers": LAYERS,
                "components": components,
                "decisions": decisions,
            }),
        );
        Ok(out)
    }
}

fn architecture_style(constraints: &[String]) -> &'static str {
    let mentions = |word: &str| constraints.iter().any(|c| c.to_lowercase().contains(word));
    if mentions("microservice") {
        "microservices"
    } else if mentions("event") {
        "event-driven"
    } else {
        "layered"
    }
}

#[async_trait]
impl Capability for Architect {
    fn name(&self) -> &str {
        "architect"
    }

    fn supported_methods(&self) -> Vec<String> {
        vec!["design_architecture".to_string()]
    }

    fn validate_params(&self, method: &str, params: &FieldMap) -> Result<(), String> {
        match method {
            "design_architecture" => {
                require_present(params, "requirements")?;
                require_present(params, "domain_model")
            }
            other => Err(unsupported(other)),
        }
    }

    async fn execute(&self, method: &str, params: &FieldMap) -> Result<FieldMap, String> {
        match method {
            "design_architecture" => self.design_architecture(params),
            other => Err(unsupported(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_components_per_entity() {
        let mut params = FieldMap::new();
        params.insert("requirements".into(), json!(["Store orders"]));
        params.insert(
            "domain_model".into(),
            json!({"entities": [{"name": "Order"}, {"name": "Invoice"}]}),
        );
        params.insert("constraints".into(), json!(["event sourcing"]));

        let out = Architect
            .execute("design_architecture", &params)
            .await
            .unwrap();
        let arch = &out["architecture"];

        assert_eq!(arch["style"], "event-driven");
        assert_eq!(arch["components"].as_array().unwrap().len(), 6);
        assert_eq!(arch["components"][0]["name"], "OrderService");
        assert_eq!(arch["decisions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_model_fails_check() {
        let mut params = FieldMap::new();
        params.insert("requirements".into(), json!([]));
        params.insert("domain_model".into(), json!({}));

        let out = Architect
            .execute("design_architecture", &params)
            .await
            .unwrap();
        assert_eq!(out["architecture"]["style"], "layered");
        assert!(out["checks"].as_array().unwrap().iter().all(|c| c["passed"] == false));
    }
}
