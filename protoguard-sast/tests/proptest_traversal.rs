//! Property-based tests for the traversal engine
//!
//! Uses proptest to verify that, over arbitrary ESTree-shaped trees:
//! 1. Scanning a node root always succeeds (totality)
//! 2. Scanning is deterministic, ordering included
//! 3. The iterative engine agrees with a naive recursive walk
//! 4. Output is ordered by line and free of duplicates

mod common;

use std::collections::HashSet;

use common::builders::*;
use proptest::prelude::*;
use protoguard_sast::domain::{Finding, Node, Rule, SourceLocation, Value};
use protoguard_sast::infrastructure::{PrototypePollutionRule, RuleRepository, scan, walk};

fn located(node: Node, line: Option<u32>) -> Node {
    match line {
        Some(line) => node.with_location(SourceLocation::new(line, 0)),
        None => node,
    }
}

fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("__proto__"),
        Just("constructor"),
        Just("prototype"),
        Just("obj"),
        Just("x"),
        Just("value"),
    ]
    .prop_map(String::from)
}

fn leaf() -> impl Strategy<Value = Node> {
    let line = || proptest::option::of(1u32..20);
    prop_oneof![
        (name(), line()).prop_map(|(n, l)| located(ident(&n), l)),
        (name(), line()).prop_map(|(n, l)| located(string(&n), l)),
        any::<i32>().prop_map(|v| number(f64::from(v))),
    ]
}

fn tree() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(6, 96, 4, |inner| {
        prop_oneof![
            (
                inner.clone(),
                inner.clone(),
                proptest::option::of(any::<bool>())
            )
                .prop_map(|(object, property, computed)| {
                    let member = Node::new("MemberExpression")
                        .with_field("object", object)
                        .with_field("property", property);
                    match computed {
                        Some(computed) => member.with_field("computed", computed),
                        None => member,
                    }
                }),
            (inner.clone(), inner.clone()).prop_map(|(left, right)| assign(left, right)),
            proptest::collection::vec(inner, 0..4)
                .prop_map(|body| Node::new("BlockStatement").with_field("body", body)),
        ]
    })
}

/// Recursive walk, first-wins dedup, stable sort by line
fn reference_scan(root: &Node, rule: &PrototypePollutionRule) -> Vec<Finding> {
    fn visit(node: &Node, rule: &PrototypePollutionRule, out: &mut Vec<Finding>) {
        if rule.matches(node) {
            out.push(rule.extract(node));
        }
        for child in node.children() {
            visit(child, rule, out);
        }
    }

    let mut raw = Vec::new();
    visit(root, rule, &mut raw);

    let mut seen = HashSet::new();
    let mut findings: Vec<Finding> = raw
        .into_iter()
        .filter(|f| {
            seen.insert((
                f.rule_name.clone(),
                f.line,
                f.property_name.clone(),
                f.snippet.clone(),
            ))
        })
        .collect();
    findings.sort_by_key(|f| f.line);
    findings
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn scan_is_total_on_node_roots(root in tree()) {
        let rules = RuleRepository::new();
        prop_assert!(scan(&Value::Node(root), rules.get_all_rules()).is_ok());
    }

    #[test]
    fn scan_is_deterministic(root in tree()) {
        let rules = RuleRepository::new();
        let tree = Value::Node(root);
        let first = scan(&tree, rules.get_all_rules()).unwrap();
        let second = scan(&tree, rules.get_all_rules()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn scan_matches_recursive_reference(root in tree()) {
        let rule = PrototypePollutionRule::new();
        let expected = reference_scan(&root, &rule);
        let actual = scan(&Value::Node(root), RuleRepository::new().get_all_rules())
            .unwrap()
            .into_findings();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn findings_are_ordered_and_unique(root in tree()) {
        let result = scan(&Value::Node(root), RuleRepository::new().get_all_rules()).unwrap();
        let findings = result.findings();

        prop_assert!(findings.windows(2).all(|w| w[0].line <= w[1].line));

        let keys: HashSet<_> = findings.iter().map(Finding::dedup_key).collect();
        prop_assert_eq!(keys.len(), findings.len());
    }

    #[test]
    fn walk_visits_every_node_once(root in tree()) {
        fn count(node: &Node) -> usize {
            1 + node.children().map(count).sum::<usize>()
        }
        prop_assert_eq!(walk(&root).count(), count(&root));
    }
}
