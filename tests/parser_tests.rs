// tests/parser_tests.rs

use squiggly::{ArgumentNode, SquigglyName, SquigglyNode, SquigglyParser};

fn compile(filter: &str) -> Vec<SquigglyNode> {
    SquigglyParser::new().parse(filter).unwrap().to_vec()
}

fn names(nodes: &[SquigglyNode]) -> Vec<String> {
    nodes.iter().map(|n| n.name().to_string()).collect()
}

// ============================================================================
// Selectors
// ============================================================================

#[test]
fn test_comma_separated_fields() {
    let nodes = compile("a,b,c");
    assert_eq!(names(&nodes), vec!["a", "b", "c"]);
    assert!(nodes.iter().all(|n| !n.negated));
}

#[test]
fn test_nested_selection() {
    let nodes = compile("a[b[c]]");
    assert_eq!(names(&nodes), vec!["a"]);
    assert!(nodes[0].squiggly);
    assert_eq!(names(&nodes[0].children), vec!["b"]);
    assert_eq!(names(&nodes[0].children[0].children), vec!["c"]);
}

#[test]
fn test_dotted_path_nests() {
    let nodes = compile("a.b.c");
    assert_eq!(names(&nodes), vec!["a"]);
    assert_eq!(names(&nodes[0].children), vec!["b"]);
    assert_eq!(names(&nodes[0].children[0].children), vec!["c"]);
}

#[test]
fn test_empty_nested_selection() {
    let nodes = compile("a[]");
    assert!(nodes[0].empty_nested);
    // An explicit empty selection is not a squiggly selection.
    assert!(!nodes[0].squiggly);
    assert!(nodes[0].children.is_empty());
}

#[test]
fn test_field_list_distributes_children() {
    let nodes = compile("(a,b)[c]");
    assert_eq!(names(&nodes), vec!["a", "b"]);
    assert_eq!(names(&nodes[0].children), vec!["c"]);
    assert_eq!(names(&nodes[1].children), vec!["c"]);
}

#[test]
fn test_negated_field() {
    let nodes = compile("a,-b");
    assert!(!nodes[0].negated);
    assert!(nodes[1].negated);
}

// ============================================================================
// Name Variants
// ============================================================================

#[test]
fn test_name_variants() {
    assert!(matches!(compile("*")[0].name, SquigglyName::AnyShallow));
    assert!(matches!(compile("**")[0].name, SquigglyName::AnyDeep));
    assert!(matches!(compile("pre*")[0].name, SquigglyName::Wildcard(_)));
    assert!(matches!(compile("$name")[0].name, SquigglyName::Variable(_)));
}

#[test]
fn test_regex_field_name() {
    let nodes = compile("/na.e/i");
    match &nodes[0].name {
        SquigglyName::Regex(regex) => {
            assert_eq!(regex.pattern(), "na.e");
            assert!(regex.is_case_insensitive());
            assert!(regex.regex().is_match("NAME"));
        }
        other => panic!("expected regex name, got {:?}", other),
    }
}

#[test]
fn test_quoted_field_name() {
    let nodes = compile("'first name'");
    assert_eq!(nodes[0].name(), "first name");
}

#[test]
fn test_integer_field_name() {
    let nodes = compile("123");
    assert_eq!(nodes[0].name(), "123");
}

#[test]
fn test_unknown_regex_flag_rejected() {
    assert!(SquigglyParser::new().parse("/abc/x").is_err());
}

// ============================================================================
// Function Chains
// ============================================================================

#[test]
fn test_value_chain_stages_receive_input() {
    let nodes = compile("a:trim|upper");
    let chain = &nodes[0].value_functions;
    assert_eq!(chain.len(), 2);
    for stage in chain {
        assert_eq!(stage.parameters[0], ArgumentNode::Input);
    }
    assert_eq!(chain[0].name, "trim");
    assert_eq!(chain[1].name, "upper");
}

#[test]
fn test_key_chain() {
    let nodes = compile("a#upper");
    assert_eq!(nodes[0].key_functions[0].name, "upper");
    assert!(nodes[0].value_functions.is_empty());
}

#[test]
fn test_null_safe_stage() {
    let nodes = compile("a?:trim|upper?|lower");
    let chain = &nodes[0].value_functions;
    assert!(chain[0].ignore_nulls);
    assert!(!chain[1].ignore_nulls);
    assert!(chain[2].ignore_nulls);
}

#[test]
fn test_function_arguments() {
    let nodes = compile("a:truncate(10, '...')");
    let stage = &nodes[0].value_functions[0];
    assert_eq!(stage.parameters.len(), 3);
    assert_eq!(stage.parameters[1], ArgumentNode::Integer(10));
    assert_eq!(stage.parameters[2], ArgumentNode::String("...".to_string()));
}

#[test]
fn test_negative_number_argument() {
    let nodes = compile("a:pad(-5)");
    assert_eq!(
        nodes[0].value_functions[0].parameters[1],
        ArgumentNode::Integer(-5)
    );
}

#[test]
fn test_minimum_integer_argument() {
    let nodes = compile("a:f(-2147483648)");
    assert_eq!(
        nodes[0].value_functions[0].parameters[1],
        ArgumentNode::Integer(i32::MIN)
    );

    let nodes = compile("a:slice([-2147483648:])");
    match &nodes[0].value_functions[0].parameters[1] {
        ArgumentNode::IntRange(range) => {
            assert_eq!(range.start.as_deref(), Some(&ArgumentNode::Integer(i32::MIN)));
        }
        other => panic!("expected int range, got {:?}", other),
    }
}

// ============================================================================
// Operator Desugaring
// ============================================================================

fn single_arg(filter: &str) -> ArgumentNode {
    compile(filter)[0].value_functions[0].parameters[1].clone()
}

#[test]
fn test_addition_desugars_to_add_call() {
    match single_arg("a:f(1+2)") {
        ArgumentNode::FunctionChain(chain) => {
            assert_eq!(chain[0].name, "add");
            assert_eq!(chain[0].parameters[0], ArgumentNode::Integer(1));
            assert_eq!(chain[0].parameters[1], ArgumentNode::Integer(2));
        }
        other => panic!("expected function chain, got {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter() {
    match single_arg("a:f(1+2*3)") {
        ArgumentNode::FunctionChain(chain) => {
            assert_eq!(chain[0].name, "add");
            match &chain[0].parameters[1] {
                ArgumentNode::FunctionChain(inner) => assert_eq!(inner[0].name, "mul"),
                other => panic!("expected nested chain, got {:?}", other),
            }
        }
        other => panic!("expected function chain, got {:?}", other),
    }
}

#[test]
fn test_named_and_symbolic_spellings_agree() {
    let test_cases = vec![
        ("a:f(1 add 2)", "a:f(1+2)"),
        ("a:f(1 lt 2)", "a:f(1<2)"),
        ("a:f(true or false)", "a:f(true||false)"),
        ("a:f('x' match /x/)", "a:f('x' =~ /x/)"),
    ];

    for (named, symbolic) in test_cases {
        assert_eq!(
            single_arg(named),
            single_arg(symbolic),
            "mismatch between {} and {}",
            named,
            symbolic
        );
    }
}

#[test]
fn test_not_prefix() {
    match single_arg("a:f(!true)") {
        ArgumentNode::FunctionChain(chain) => {
            assert_eq!(chain[0].name, "not");
            assert_eq!(chain[0].parameters[0], ArgumentNode::Boolean(true));
        }
        other => panic!("expected function chain, got {:?}", other),
    }
}

// ============================================================================
// Ranges and Lambdas
// ============================================================================

#[test]
fn test_int_range_variants() {
    match single_arg("a:slice([1:3])") {
        ArgumentNode::IntRange(range) => {
            assert_eq!(range.start.as_deref(), Some(&ArgumentNode::Integer(1)));
            assert_eq!(range.end.as_deref(), Some(&ArgumentNode::Integer(3)));
        }
        other => panic!("expected int range, got {:?}", other),
    }

    match single_arg("a:slice([:$n])") {
        ArgumentNode::IntRange(range) => {
            assert!(range.start.is_none());
            assert_eq!(
                range.end.as_deref(),
                Some(&ArgumentNode::Variable("n".to_string()))
            );
        }
        other => panic!("expected int range, got {:?}", other),
    }
}

#[test]
fn test_range_rejects_non_integer_endpoint() {
    assert!(SquigglyParser::new().parse("a:slice(['x':3])").is_err());
}

#[test]
fn test_lambda_body_wrapped_in_identity() {
    match single_arg("a:map((x) -> x)") {
        ArgumentNode::Lambda(lambda) => {
            assert_eq!(lambda.parameters.len(), 1);
            assert_eq!(lambda.body.name, squiggly::IDENTITY_FUNCTION);
        }
        other => panic!("expected lambda, got {:?}", other),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_malformed_filters_rejected() {
    let parser = SquigglyParser::new();
    // Negation is spelled with a leading minus; "a.b.-c" is not a path.
    let bad = vec!["a[b", "a..b", "a:", "a,,b", "[a]", "a]", "a:f(", "-", "a.b.-c"];
    for filter in bad {
        assert!(parser.parse(filter).is_err(), "accepted: {}", filter);
    }
}

#[test]
fn test_error_carries_position() {
    let err = SquigglyParser::new().parse("a,\n ?").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 2"), "message was: {}", message);
}
