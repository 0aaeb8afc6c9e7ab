//! Rule-tree documents
//!
//! The rule tree is opaque to this client except for the narrow mutations
//! the higher-level workflows need: injecting a CP code and patching fields
//! on the `origin` and `sureRoute` behaviors of the default rule. The only
//! structural requirement placed on a document is a top-level `rules` field.

use serde_json::Value;
use thiserror::Error;

/// Errors working with rule-tree documents
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleTreeError {
    #[error("rule document is not valid JSON: {0}")]
    Malformed(String),

    #[error("rule document has no top-level `rules` field")]
    MissingRules,

    #[error("default rule has no `{0}` behavior")]
    BehaviorNotFound(&'static str),
}

/// A version's rule tree, carried as an opaque JSON document
#[derive(Debug, Clone)]
pub struct RuleTreeDocument {
    value: Value,
}

impl RuleTreeDocument {
    /// Accept a JSON value, requiring the top-level `rules` field
    pub fn from_value(value: Value) -> Result<Self, RuleTreeError> {
        if value.get("rules").map(Value::is_object) != Some(true) {
            return Err(RuleTreeError::MissingRules);
        }
        Ok(Self { value })
    }

    /// Parse raw bytes (e.g. an imported rule file)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RuleTreeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| RuleTreeError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Borrow the underlying document
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Take the underlying document
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Serialize for export
    pub fn to_bytes(&self) -> Vec<u8> {
        // Pretty output: exported documents are edited by hand
        serde_json::to_vec_pretty(&self.value).unwrap_or_default()
    }

    fn default_rule_behaviors(&mut self) -> Option<&mut Vec<Value>> {
        self.value
            .get_mut("rules")?
            .get_mut("behaviors")?
            .as_array_mut()
    }

    fn behavior_options(&mut self, name: &'static str) -> Result<&mut Value, RuleTreeError> {
        let behaviors = self
            .default_rule_behaviors()
            .ok_or(RuleTreeError::BehaviorNotFound(name))?;
        for behavior in behaviors.iter_mut() {
            if behavior.get("name").and_then(Value::as_str) == Some(name) {
                if !behavior.get("options").map(Value::is_object).unwrap_or(false) {
                    behavior["options"] = Value::Object(Default::default());
                }
                return Ok(&mut behavior["options"]);
            }
        }
        Err(RuleTreeError::BehaviorNotFound(name))
    }

    /// Rewrite the default rule's `cpCode` behavior to the given numeric id
    pub fn set_cpcode(&mut self, cpcode: u64) -> Result<(), RuleTreeError> {
        let options = self.behavior_options("cpCode")?;
        options["value"] = serde_json::json!({ "id": cpcode });
        Ok(())
    }

    /// Patch the default rule's `origin` behavior
    pub fn set_origin(
        &mut self,
        hostname: &str,
        forward_host_header: Option<&str>,
    ) -> Result<(), RuleTreeError> {
        let options = self.behavior_options("origin")?;
        options["hostname"] = Value::String(hostname.to_string());
        if let Some(header) = forward_host_header {
            options["forwardHostHeader"] = Value::String("CUSTOM".to_string());
            options["customForwardHostHeader"] = Value::String(header.to_string());
        }
        Ok(())
    }

    /// Patch the default rule's `sureRoute` behavior's test object
    pub fn set_sureroute(&mut self, test_object_url: &str) -> Result<(), RuleTreeError> {
        let options = self.behavior_options("sureRoute")?;
        options["testObjectUrl"] = Value::String(test_object_url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> RuleTreeDocument {
        RuleTreeDocument::from_value(serde_json::json!({
            "rules": {
                "name": "default",
                "behaviors": [
                    { "name": "origin", "options": { "hostname": "old.example.com" } },
                    { "name": "cpCode", "options": { "value": { "id": 1 } } },
                    { "name": "sureRoute", "options": {} }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_requires_rules_field() {
        let err = RuleTreeDocument::from_value(serde_json::json!({ "other": {} })).unwrap_err();
        assert_eq!(err, RuleTreeError::MissingRules);
    }

    #[test]
    fn test_set_cpcode() {
        let mut doc = document();
        doc.set_cpcode(98765).unwrap();
        let behaviors = &doc.as_value()["rules"]["behaviors"];
        assert_eq!(behaviors[1]["options"]["value"]["id"], 98765);
    }

    #[test]
    fn test_set_origin_with_host_header() {
        let mut doc = document();
        doc.set_origin("new.example.com", Some("www.example.com")).unwrap();
        let options = &doc.as_value()["rules"]["behaviors"][0]["options"];
        assert_eq!(options["hostname"], "new.example.com");
        assert_eq!(options["forwardHostHeader"], "CUSTOM");
        assert_eq!(options["customForwardHostHeader"], "www.example.com");
    }

    #[test]
    fn test_missing_behavior_is_an_error() {
        let mut doc = RuleTreeDocument::from_value(serde_json::json!({
            "rules": { "name": "default", "behaviors": [] }
        }))
        .unwrap();
        assert_eq!(
            doc.set_cpcode(1).unwrap_err(),
            RuleTreeError::BehaviorNotFound("cpCode")
        );
    }
}
