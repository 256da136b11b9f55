//! `{{variable}}` template resolution over step configs.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// The execution-wide variable store: one flat mutable mapping, shared by
/// reference across the whole step tree. No nested scopes.
pub type Variables = HashMap<String, Value>;

static TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("template pattern"));

/// Resolve every `{{name}}` token in the top-level string values of a step
/// config. Unresolved tokens stay literal; non-string and nested values
/// pass through untouched.
pub fn resolve_config(config: &Map<String, Value>, variables: &Variables) -> Map<String, Value> {
    config
        .iter()
        .map(|(key, value)| {
            let resolved = match value {
                Value::String(s) => Value::String(resolve_str(s, variables)),
                other => other.clone(),
            };
            (key.clone(), resolved)
        })
        .collect()
}

fn resolve_str(input: &str, variables: &Variables) -> String {
    TEMPLATE
        .replace_all(input, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => stringify(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Template/string form of a variable value: strings verbatim, scalars via
/// display, arrays and objects as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variables(pairs: &[(&str, Value)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn config(value: Value) -> Map<String, Value> {
        value.as_object().expect("object").clone()
    }

    #[test]
    fn replaces_tokens_with_store_values() {
        let vars = variables(&[("x", json!("42"))]);
        let resolved = resolve_config(&config(json!({"url": "https://a.test/{{x}}"})), &vars);
        assert_eq!(resolved["url"], "https://a.test/42");
    }

    #[test]
    fn unresolved_tokens_stay_literal() {
        let vars = Variables::new();
        let resolved = resolve_config(&config(json!({"url": "https://a.test/{{missing}}"})), &vars);
        assert_eq!(resolved["url"], "https://a.test/{{missing}}");
    }

    #[test]
    fn several_tokens_in_one_value() {
        let vars = variables(&[("a", json!(1)), ("b", json!("two"))]);
        let resolved = resolve_config(&config(json!({"text": "{{a}}-{{b}}-{{c}}"})), &vars);
        assert_eq!(resolved["text"], "1-two-{{c}}");
    }

    #[test]
    fn non_string_values_pass_through() {
        let vars = variables(&[("n", json!(9))]);
        let resolved = resolve_config(
            &config(json!({"count": 5, "flags": {"inner": "{{n}}"}})),
            &vars,
        );
        assert_eq!(resolved["count"], 5);
        // Nested values are intentionally left unresolved.
        assert_eq!(resolved["flags"]["inner"], "{{n}}");
    }

    #[test]
    fn arrays_and_objects_stringify_as_json() {
        let vars = variables(&[("list", json!(["a", "b"])), ("obj", json!({"k": 1}))]);
        let resolved = resolve_config(&config(json!({"text": "{{list}}|{{obj}}"})), &vars);
        assert_eq!(resolved["text"], "[\"a\",\"b\"]|{\"k\":1}");
    }

    #[test]
    fn numbers_and_booleans_stringify_via_display() {
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(null)), "null");
    }
}
