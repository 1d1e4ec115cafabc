//! Domain modeler: entities, actors and relationships from requirements.

use super::{check, require_present, unsupported};
use async_trait::async_trait;
use relay_domain::{Capability, FieldMap};
use serde_json::{Value, json};

const DETERMINERS: [&str; 6] = ["a", "an", "the", "each", "every", "new"];

pub struct DomainModeler;

impl DomainModeler {
    fn build_domain_model(&self, params: &FieldMap) -> Result<FieldMap, String> {
        let texts = requirement_texts(params.get("requirements"));
        let actors: Vec<String> = params
            .get("user_stories")
            .and_then(Value::as_array)
            .map(|stories| {
                let mut roles: Vec<String> = Vec::new();
                for role in stories.iter().filter_map(|s| s.get("role")?.as_str()) {
                    let role = capitalize(role);
                    if !roles.contains(&role) {
                        roles.push(role);
                    }
                }
                roles
            })
            .unwrap_or_default();

        // (name, mentions) in order of first appearance
        let mut entities: Vec<(String, usize)> = Vec::new();
        for text in &texts {
            for noun in nouns_after_determiners(text) {
                let name = capitalize(&noun);
                if actors.contains(&name) {
                    continue;
                }
                match entities.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, mentions)) => *mentions += 1,
                    None => entities.push((name, 1)),
                }
            }
        }

        let relationships: Vec<Value> = actors
            .iter()
            .flat_map(|actor| {
                entities
                    .iter()
                    .map(move |(entity, _)| json!({ "from": actor, "to": entity, "kind": "uses" }))
            })
            .collect();

        let mut out = FieldMap::new();
        out.insert(
            "checks".into(),
            json!([
                check("has_entities", !entities.is_empty()),
                check("has_actors", !actors.is_empty()),
            ]),
        );
        out.insert(
            "domain_model".into(),
            json!({
                "entities": entities
                    .iter()
                    .map(|(name, mentions)| json!({ "name": name, "mentions": mentions }))
                    .collect::<Vec<_>>(),
                "actors": actors,
                "relationships": relationships,
            }),
        );
        Ok(out)
    }
}

#[async_trait]
impl Capability for DomainModeler {
    fn name(&self) -> &str {
        "domain_modeler"
    }

    fn supported_methods(&self) -> Vec<String> {
        vec!["build_domain_model".to_string()]
    }

    fn validate_params(&self, method: &str, params: &FieldMap) -> Result<(), String> {
        match method {
            "build_domain_model" => require_present(params, "requirements"),
            other => Err(unsupported(other)),
        }
    }

    async fn execute(&self, method: &str, params: &FieldMap) -> Result<FieldMap, String> {
        match method {
            "build_domain_model" => self.build_domain_model(params),
            other => Err(unsupported(other)),
        }
    }
}

/// Requirement texts from an array of `{text}` objects or plain strings.
pub(super) fn requirement_texts(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => other.get("text")?.as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn nouns_after_determiners(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    words
        .windows(2)
        .filter(|pair| DETERMINERS.contains(&pair[0].as_str()) && pair[1].len() > 2)
        .map(|pair| singular(&pair[1]))
        .collect()
}

fn singular(word: &str) -> String {
    match word.strip_suffix('s') {
        Some(stem) if !word.ends_with("ss") && stem.len() > 2 => stem.to_string(),
        _ => word.to_string(),
    }
}

pub(super) fn capitalize(word: &str) -> String {
    let mut chars = word.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nouns_after_determiners() {
        assert_eq!(
            nouns_after_determiners("Members borrow a book from the catalogs, an id"),
            ["book", "catalog"]
        );
    }

    #[tokio::test]
    async fn test_build_domain_model() {
        let mut params = FieldMap::new();
        params.insert(
            "requirements".into(),
            json!([
                {"id": "REQ-001", "text": "A member borrows a book"},
                "The librarian shelves the book",
            ]),
        );
        params.insert(
            "user_stories".into(),
            json!([{"role": "member", "want": "x", "benefit": "y"}]),
        );

        let out = DomainModeler
            .execute("build_domain_model", &params)
            .await
            .unwrap();
        let model = &out["domain_model"];

        let names: Vec<&str> = model["entities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Book", "Librarian"]);
        assert_eq!(model["entities"][0]["mentions"], 2);
        assert_eq!(model["actors"], json!(["Member"]));
        assert_eq!(model["relationships"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_requires_requirements() {
        assert!(DomainModeler
            .validate_params("build_domain_model", &FieldMap::new())
            .is_err());
    }
}
