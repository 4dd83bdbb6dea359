use serde_json::{Map, Value, json};

use crate::ast::name::SquigglyName;
use crate::ast::node::{ArgumentNode, FunctionNode, LambdaParameter, SquigglyNode};

/// Renders compiled nodes as JSON for inspection tooling.
///
/// Flags and empty collections are omitted so the output stays readable for
/// simple filters.
pub fn nodes_to_json(nodes: &[SquigglyNode]) -> Value {
    Value::Array(nodes.iter().map(node_to_json).collect())
}

fn node_to_json(node: &SquigglyNode) -> Value {
    let mut object = Map::new();
    object.insert("name".to_string(), name_to_json(&node.name));
    object.insert(
        "context".to_string(),
        json!({ "line": node.context.line, "column": node.context.column }),
    );

    if node.negated {
        object.insert("negated".to_string(), Value::Bool(true));
    }
    if node.squiggly {
        object.insert("squiggly".to_string(), Value::Bool(true));
    }
    if node.empty_nested {
        object.insert("empty_nested".to_string(), Value::Bool(true));
    }

    if !node.key_functions.is_empty() {
        object.insert(
            "key_functions".to_string(),
            Value::Array(node.key_functions.iter().map(function_to_json).collect()),
        );
    }
    if !node.value_functions.is_empty() {
        object.insert(
            "value_functions".to_string(),
            Value::Array(node.value_functions.iter().map(function_to_json).collect()),
        );
    }
    if !node.children.is_empty() {
        object.insert(
            "children".to_string(),
            Value::Array(node.children.iter().map(node_to_json).collect()),
        );
    }

    Value::Object(object)
}

fn name_to_json(name: &SquigglyName) -> Value {
    match name {
        SquigglyName::Exact(value) => json!({ "type": "exact", "value": value }),
        SquigglyName::Wildcard(pattern) => json!({ "type": "wildcard", "pattern": pattern }),
        SquigglyName::Regex(regex) => json!({
            "type": "regex",
            "pattern": regex.pattern(),
            "case_insensitive": regex.is_case_insensitive(),
        }),
        SquigglyName::Variable(name) => json!({ "type": "variable", "name": name }),
        SquigglyName::AnyShallow => json!({ "type": "any_shallow" }),
        SquigglyName::AnyDeep => json!({ "type": "any_deep" }),
    }
}

fn function_to_json(function: &FunctionNode) -> Value {
    json!({
        "name": function.name,
        "ignore_nulls": function.ignore_nulls,
        "parameters": function
            .parameters
            .iter()
            .map(argument_to_json)
            .collect::<Vec<_>>(),
    })
}

fn argument_to_json(argument: &ArgumentNode) -> Value {
    match argument {
        ArgumentNode::Boolean(value) => json!({ "type": "boolean", "value": value }),
        ArgumentNode::Integer(value) => json!({ "type": "integer", "value": value }),
        ArgumentNode::Float(value) => json!({ "type": "float", "value": value }),
        ArgumentNode::String(value) => json!({ "type": "string", "value": value }),
        ArgumentNode::Regex(regex) => json!({
            "type": "regex",
            "pattern": regex.pattern(),
            "case_insensitive": regex.is_case_insensitive(),
        }),
        ArgumentNode::Variable(name) => json!({ "type": "variable", "name": name }),
        ArgumentNode::IntRange(range) => json!({
            "type": "int_range",
            "start": range.start.as_deref().map(argument_to_json),
            "end": range.end.as_deref().map(argument_to_json),
        }),
        ArgumentNode::FunctionChain(functions) => json!({
            "type": "function_chain",
            "functions": functions.iter().map(function_to_json).collect::<Vec<_>>(),
        }),
        ArgumentNode::Lambda(lambda) => json!({
            "type": "lambda",
            "parameters": lambda
                .parameters
                .iter()
                .map(|parameter| match parameter {
                    LambdaParameter::Named(name) => Value::String(name.clone()),
                    LambdaParameter::Anonymous => Value::String("_".to_string()),
                })
                .collect::<Vec<_>>(),
            "body": function_to_json(&lambda.body),
        }),
        ArgumentNode::Input => json!({ "type": "input" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::SquigglyParser;

    #[test]
    fn test_simple_field_rendering() {
        let parser = SquigglyParser::new();
        let nodes = parser.parse("a").unwrap();
        let rendered = nodes_to_json(&nodes);
        assert_eq!(rendered[0]["name"]["type"], "exact");
        assert_eq!(rendered[0]["name"]["value"], "a");
        assert!(rendered[0].get("negated").is_none());
    }

    #[test]
    fn test_chain_rendering_includes_input() {
        let parser = SquigglyParser::new();
        let nodes = parser.parse("a:trim").unwrap();
        let rendered = nodes_to_json(&nodes);
        let stage = &rendered[0]["value_functions"][0];
        assert_eq!(stage["name"], "trim");
        assert_eq!(stage["parameters"][0]["type"], "input");
    }
}
