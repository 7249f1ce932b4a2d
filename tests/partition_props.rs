//! Property tests for harvesting and matching

use childmatch::{
    harvest, match_children, ElementDefinition, ElementDefinitionNavigator, ElementNode,
    StructureDefinition,
};
use proptest::prelude::*;
use std::sync::Arc;

const DECLARED: &[&str] = &["a", "b", "c", "a[x]", "aBoolean", "bString"];
const INSTANCE: &[&str] = &["a", "b", "c", "d", "aBoolean"];
const TYPES: &[Option<&str>] = &[None, Some("boolean"), Some("string"), Some("")];

fn declared_names() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(DECLARED), 0..10)
}

fn instance_children() -> impl Strategy<Value = Vec<ElementNode>> {
    prop::collection::vec(
        (prop::sample::select(INSTANCE), prop::sample::select(TYPES)),
        0..12,
    )
    .prop_map(|children| {
        children
            .into_iter()
            .map(|(name, type_name)| {
                let node = ElementNode::new(name);
                match type_name {
                    Some(t) => node.with_type(t),
                    None => node,
                }
            })
            .collect()
    })
}

fn navigator(names: &[&str]) -> ElementDefinitionNavigator {
    let mut elements = vec![ElementDefinition::new("Root")];
    elements.extend(names.iter().map(|n| ElementDefinition::new(format!("Root.{}", n))));
    ElementDefinitionNavigator::new(Arc::new(StructureDefinition::from_elements(elements).unwrap()))
}

fn collapsed(names: &[&'static str]) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for name in names {
        if out.last() != Some(name) {
            out.push(*name);
        }
    }
    out
}

proptest! {
    #[test]
    fn every_child_lands_in_exactly_one_place(names in declared_names(), children in instance_children()) {
        let mut nav = navigator(&names);
        let mut root = ElementNode::new("Root");
        root.children = children;

        let result = match_children(&mut nav, &root).unwrap();

        let mut seen: Vec<usize> = result
            .matches
            .iter()
            .flat_map(|m| m.instances.iter().filter_map(|r| r.position()))
            .chain(result.unmatched.iter().map(|c| c.position))
            .collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..root.children.len()).collect();
        prop_assert_eq!(seen, expected);

        for m in &result.matches {
            for r in &m.instances {
                let position = r.position().unwrap();
                prop_assert!(std::ptr::eq(r.node(), &root.children[position]));
            }
        }
    }

    #[test]
    fn correspondences_follow_harvest_order(names in declared_names(), children in instance_children()) {
        let mut nav = navigator(&names);
        let mut root = ElementNode::new("Root");
        root.children = children;

        let result = match_children(&mut nav, &root).unwrap();

        let declared: Vec<&str> = result.matches.iter().map(|m| m.declared.path_name()).collect();
        prop_assert_eq!(declared, collapsed(&names));
        for (slot, m) in result.matches.iter().enumerate() {
            prop_assert_eq!(m.declared.slot(), slot);
        }
    }

    #[test]
    fn matched_and_unmatched_keep_document_order(names in declared_names(), children in instance_children()) {
        let mut nav = navigator(&names);
        let mut root = ElementNode::new("Root");
        root.children = children;

        let result = match_children(&mut nav, &root).unwrap();

        for m in &result.matches {
            let positions: Vec<usize> = m.instances.iter().filter_map(|r| r.position()).collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
        let unmatched: Vec<usize> = result.unmatched.iter().map(|c| c.position).collect();
        prop_assert!(unmatched.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn harvest_is_idempotent_and_restores_cursor(names in declared_names()) {
        let mut nav = navigator(&names);
        let before = nav.position();

        let first: Vec<String> = harvest(&mut nav).unwrap().iter().map(|d| d.path_name().to_string()).collect();
        prop_assert_eq!(nav.position(), before);
        let second: Vec<String> = harvest(&mut nav).unwrap().iter().map(|d| d.path_name().to_string()).collect();
        prop_assert_eq!(nav.position(), before);

        prop_assert_eq!(&first, &second);
        prop_assert!(first.windows(2).all(|w| w[0] != w[1]));
    }
}
