//! Documenter: renders the phase products into a Markdown specification.

use super::domain_modeler::requirement_texts;
use super::{check, require_present, require_str, unsupported};
use async_trait::async_trait;
use relay_domain::{Capability, FieldMap};
use serde_json::{Value, json};
use std::fmt::Write;

pub struct Documenter;

impl Documenter {
    fn write_specification(&self, params: &FieldMap) -> Result<FieldMap, String> {
        let project = require_str(params, "project_name")?;
        let requirements = requirement_texts(params.get("requirements"));
        let model = params.get("domain_model").cloned().unwrap_or(Value::Null);
        let architecture = params.get("architecture").cloned().unwrap_or(Value::Null);

        let mut doc = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(doc, "# {} Specification\n", project);

        let _ = writeln!(doc, "## Requirements\n");
        for (i, text) in requirements.iter().enumerate() {
            let _ = writeln!(doc, "{}. {}", i + 1, text);
        }

        if let Some(stories) = params.get("user_stories").and_then(Value::as_array)
            && !stories.is_empty()
        {
            let _ = writeln!(doc, "\n## User Stories\n");
            for story in stories {
                let field = |name: &str| story.get(name).and_then(Value::as_str).unwrap_or("?");
                let _ = writeln!(
                    doc,
                    "- As a {}, I want {}, so that {}.",
                    field("role"),
                    field("want"),
                    field("benefit")
                );
            }
        }

        let _ = writeln!(doc, "\n## Domain Model\n");
        for entity in names(&model, "entities") {
            let _ = writeln!(doc, "- {}", entity);
        }

        let _ = writeln!(doc, "\n## Architecture\n");
        if let Some(style) = architecture.get("style").and_then(Value::as_str) {
            let _ = writeln!(doc, "Style: {}\n", style);
        }
        for component in architecture
            .get("components")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let name = component.get("name").and_then(Value::as_str).unwrap_or("?");
            let layer = component.get("layer").and_then(Value::as_str).unwrap_or("?");
            let _ = writeln!(doc, "- `{}` ({})", name, layer);
        }

        let mut out = FieldMap::new();
        out.insert(
            "checks".into(),
            json!([
                check("requirements_section", !requirements.is_empty()),
                check("domain_section", !names(&model, "entities").is_empty()),
                check("architecture_section", architecture.get("components").is_some()),
            ]),
        );
        out.insert("specification".into(), Value::String(doc));
        Ok(out)
    }
}

fn names(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|e| e.get("name")?.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Capability for Documenter {
    fn name(&self) -> &str {
        "documenter"
    }

    fn supported_methods(&self) -> Vec<String> {
        vec!["write_specification".to_string()]
    }

    fn validate_params(&self, method: &str, params: &FieldMap) -> Result<(), String> {
        match method {
            "write_specification" => {
                require_str(params, "project_name")?;
                for name in ["requirements", "domain_model", "architecture"] {
                    require_present(params, name)?;
                }
                Ok(())
            }
            other => Err(unsupported(other)),
        }
    }

    async fn execute(&self, method: &str, params: &FieldMap) -> Result<FieldMap, String> {
        match method {
            "write_specification" => self.write_specification(params),
            other => Err(unsupported(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_specification_sections() {
        let mut params = FieldMap::new();
        params.insert("project_name".into(), json!("Library"));
        params.insert("requirements".into(), json!([{"text": "Lend books"}]));
        params.insert(
            "user_stories".into(),
            json!([{"role": "member", "want": "borrow", "benefit": "read"}]),
        );
        params.insert("domain_model".into(), json!({"entities": [{"name": "Book"}]}));
        params.insert(
            "architecture".into(),
            json!({"style": "layered", "components": [{"name": "BookService", "layer": "application"}]}),
        );

        let out = Documenter
            .execute("write_specification", &params)
            .await
            .unwrap();
        let spec = out["specification"].as_str().unwrap();

        assert!(spec.starts_with("# Library Specification"));
        assert!(spec.contains("1. Lend books"));
        assert!(spec.contains("- As a member, I want borrow, so that read."));
        assert!(spec.contains("- Book"));
        assert!(spec.contains("- `BookService` (application)"));
        assert!(out["checks"].as_array().unwrap().iter().all(|c| c["passed"] == true));
    }

    #[test]
    fn test_validate_requires_all_inputs() {
        let mut params = FieldMap::new();
        params.insert("project_name".into(), json!("Library"));
        params.insert("requirements".into(), json!([]));
        let err = Documenter
            .validate_params("write_specification", &params)
            .unwrap_err();
        assert!(err.contains("domain_model"));
    }
}
