//! Requirements analyst: statements and user stories from a project description.

use super::{check, require_present, require_str, string_list, unsupported};
use async_trait::async_trait;
use relay_domain::{Capability, FieldMap, UserStory};
use serde_json::{Value, json};

pub struct RequirementsAnalyst;

impl RequirementsAnalyst {
    fn extract_requirements(&self, params: &FieldMap) -> Result<FieldMap, String> {
        let project = require_str(params, "project_name")?;
        let description = require_str(params, "description")?;
        let stakeholders = string_list(params.get("stakeholders"));
        let constraints = string_list(params.get("constraints"));

        let statements = split_statements(description);
        let mut stories: Vec<UserStory> = statements
            .iter()
            .filter_map(|s| UserStory::parse(&Value::String(s.clone())).ok())
            .collect();

        // Without explicit stories, give every stakeholder the first plain statement.
        if stories.is_empty()
            && let Some(first) = statements.first()
        {
            stories = stakeholders
                .iter()
                .map(|role| UserStory {
                    role: role.clone(),
                    want: lowercase_first(first),
                    benefit: format!("{} serves its purpose", project),
                })
                .collect();
        }

        let requirements: Vec<Value> = statements
            .iter()
            .enumerate()
            .map(|(i, text)| {
                json!({
                    "id": format!("REQ-{:03}", i + 1),
                    "text": text,
                    "priority": priority(text),
                    "kind": "functional",
                })
            })
            .chain(constraints.iter().enumerate().map(|(i, text)| {
                json!({
                    "id": format!("NFR-{:03}", i + 1),
                    "text": text,
                    "priority": "must",
                    "kind": "constraint",
                })
            }))
            .collect();

        let mut out = FieldMap::new();
        if statements.is_empty() {
            out.insert(
                "errors".into(),
                json!(["description contains no requirement statements"]),
            );
        }
        out.insert(
            "checks".into(),
            json!([
                check("has_requirements", !statements.is_empty()),
                check("has_user_stories", !stories.is_empty()),
                check("stakeholders_covered", stakeholders_covered(&stakeholders, &stories)),
            ]),
        );
        out.insert("requirements".into(), Value::Array(requirements));
        out.insert("user_stories".into(), json!(stories));
        Ok(out)
    }

    fn analyze_user_story(&self, params: &FieldMap) -> Result<FieldMap, String> {
        let value = params
            .get("user_story")
            .ok_or_else(|| "missing required parameter 'user_story'".to_string())?;
        let story = UserStory::parse(value)?;

        let mut out = FieldMap::new();
        out.insert(
            "requirement".into(),
            json!(format!("The system shall allow a {} to {}.", story.role, story.want)),
        );
        out.insert(
            "acceptance_criteria".into(),
            json!([
                format!("Given a {}, when they {}, then the action succeeds", story.role, story.want),
                format!("The outcome ensures {}", story.benefit),
            ]),
        );
        out.insert("user_story".into(), json!(story));
        Ok(out)
    }
}

#[async_trait]
impl Capability for RequirementsAnalyst {
    fn name(&self) -> &str {
        "requirements_analyst"
    }

    fn supported_methods(&self) -> Vec<String> {
        vec![
            "extract_requirements".to_string(),
            "analyze_user_story".to_string(),
        ]
    }

    fn validate_params(&self, method: &str, params: &FieldMap) -> Result<(), String> {
        match method {
            "extract_requirements" => {
                require_str(params, "project_name")?;
                require_str(params, "description").map(|_| ())
            }
            "analyze_user_story" => require_present(params, "user_story"),
            other => Err(unsupported(other)),
        }
    }

    async fn execute(&self, method: &str, params: &FieldMap) -> Result<FieldMap, String> {
        match method {
            "extract_requirements" => self.extract_requirements(params),
            "analyze_user_story" => self.analyze_user_story(params),
            other => Err(unsupported(other)),
        }
    }
}

/// Sentences and lines of `text`, trimmed, without trailing punctuation.
fn split_statements(text: &str) -> Vec<String> {
    text.split(['\n', ';'])
        .flat_map(|line| line.split(". "))
        .map(|s| s.trim().trim_start_matches(['-', '*']).trim().trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn priority(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if lower.contains("must") || lower.contains("shall") {
        "must"
    } else if lower.contains("could") || lower.contains("may") {
        "could"
    } else {
        "should"
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn stakeholders_covered(stakeholders: &[String], stories: &[UserStory]) -> bool {
    stakeholders.iter().all(|s| {
        stories
            .iter()
            .any(|story| story.role.eq_ignore_ascii_case(s))
    })
}
