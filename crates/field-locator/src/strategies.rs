//! The matching strategies, as pure functions over document snapshots.
//!
//! Every strategy is visibility-gated: a structural match on a hidden
//! element is treated as no match, so the chain can fall through to a
//! strategy that finds a usable control.

use checkout_core_types::FieldDescriptor;
use page_port::DomNode;

use crate::normalize::fold;
use crate::types::{LocatorStrategy, TargetKind};

/// One locator strategy over a snapshot. Candidate order inside the
/// descriptor wins over document order.
pub trait LocateStrategy: Send + Sync {
    fn kind(&self) -> LocatorStrategy;

    fn locate(
        &self,
        dom: &[DomNode],
        descriptor: &FieldDescriptor,
        target: TargetKind,
    ) -> Option<u64>;
}

/// The default fallback chain, in order.
pub fn default_chain() -> Vec<Box<dyn LocateStrategy>> {
    vec![
        Box::new(LabelExactStrategy),
        Box::new(AttributeKeywordStrategy),
        Box::new(ContenteditableStrategy),
    ]
}

/// Strategy 1: a `<label>` whose folded text equals a candidate exactly.
///
/// A label carrying `for` resolves through the referenced id; one without
/// `for` resolves to the first following control of the requested kind.
pub struct LabelExactStrategy;

impl LocateStrategy for LabelExactStrategy {
    fn kind(&self) -> LocatorStrategy {
        LocatorStrategy::LabelExact
    }

    fn locate(
        &self,
        dom: &[DomNode],
        descriptor: &FieldDescriptor,
        target: TargetKind,
    ) -> Option<u64> {
        for candidate in &descriptor.labels {
            let want = fold(candidate);
            for (index, label) in dom
                .iter()
                .enumerate()
                .filter(|(_, n)| n.is_tag("label") && fold(&n.text) == want)
            {
                if let Some(hit) = resolve_label(dom, index, label, target) {
                    return Some(hit);
                }
            }
        }
        None
    }
}

fn resolve_label(
    dom: &[DomNode],
    label_index: usize,
    label: &DomNode,
    target: TargetKind,
) -> Option<u64> {
    if let Some(for_id) = label.attr("for") {
        return dom
            .iter()
            .find(|n| n.attr("id") == Some(for_id) && n.is_any_tag(target.tags()) && n.visible)
            .map(|n| n.node);
    }
    // The label binds to the first following control regardless of state;
    // a hidden one is a non-match rather than a license to grab a later,
    // unrelated field.
    dom[label_index + 1..]
        .iter()
        .find(|n| n.is_any_tag(target.tags()))
        .filter(|n| n.visible)
        .map(|n| n.node)
}

/// Strategy 2: keyword substring over `name|id|placeholder|aria-label`.
pub struct AttributeKeywordStrategy;

const KEYWORD_ATTRS: [&str; 4] = ["name", "id", "placeholder", "aria-label"];

impl LocateStrategy for AttributeKeywordStrategy {
    fn kind(&self) -> LocatorStrategy {
        LocatorStrategy::AttributeKeyword
    }

    fn locate(
        &self,
        dom: &[DomNode],
        descriptor: &FieldDescriptor,
        target: TargetKind,
    ) -> Option<u64> {
        for keyword in &descriptor.keywords {
            let want = fold(keyword);
            for node in dom.iter().filter(|n| n.visible && n.is_any_tag(target.tags())) {
                let matched = KEYWORD_ATTRS
                    .iter()
                    .filter_map(|attr| node.attr(attr))
                    .any(|value| fold(value).contains(&want));
                if matched {
                    return Some(node.node);
                }
            }
        }
        None
    }
}

/// Strategy 3: `contenteditable="true"` surfaces whose `aria-label` carries
/// a keyword. Text entry only; selects never resolve here.
pub struct ContenteditableStrategy;

impl LocateStrategy for ContenteditableStrategy {
    fn kind(&self) -> LocatorStrategy {
        LocatorStrategy::Contenteditable
    }

    fn locate(
        &self,
        dom: &[DomNode],
        descriptor: &FieldDescriptor,
        target: TargetKind,
    ) -> Option<u64> {
        if target != TargetKind::Input {
            return None;
        }
        for keyword in &descriptor.keywords {
            let want = fold(keyword);
            let hit = dom.iter().find(|n| {
                n.visible
                    && n.attr("contenteditable") == Some("true")
                    && n.attr("aria-label")
                        .map_or(false, |value| fold(value).contains(&want))
            });
            if let Some(node) = hit {
                return Some(node.node);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn node(id: u64, tag: &str, attrs: &[(&str, &str)], text: &str, visible: bool) -> DomNode {
        DomNode {
            node: id,
            tag: tag.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            text: text.to_string(),
            visible,
        }
    }

    fn descriptor(labels: &[&str], keywords: &[&str]) -> FieldDescriptor {
        FieldDescriptor::new(
            "email",
            labels.iter().map(|s| s.to_string()).collect(),
            keywords.iter().map(|s| s.to_string()).collect(),
            "testuser@example.com",
        )
    }

    #[test]
    fn label_for_reference_wins() {
        let dom = vec![
            node(0, "label", &[("for", "em")], "E-Mail", true),
            node(1, "input", &[("id", "other")], "", true),
            node(2, "input", &[("id", "em")], "", true),
        ];
        let desc = descriptor(&["E-Mail"], &[]);
        let hit = LabelExactStrategy.locate(&dom, &desc, TargetKind::Input);
        assert_eq!(hit, Some(2));
    }

    #[test]
    fn label_without_for_takes_first_following_control() {
        let dom = vec![
            node(0, "input", &[], "", true),
            node(1, "label", &[], "E-Mail-Adresse", true),
            node(2, "div", &[], "", true),
            node(3, "input", &[], "", true),
        ];
        let desc = descriptor(&["E-Mail", "E-Mail-Adresse"], &[]);
        let hit = LabelExactStrategy.locate(&dom, &desc, TargetKind::Input);
        assert_eq!(hit, Some(3));
    }

    #[test]
    fn earlier_label_candidate_beats_later_one() {
        let dom = vec![
            node(0, "label", &[("for", "b")], "Email", true),
            node(1, "label", &[("for", "a")], "E-Mail", true),
            node(2, "input", &[("id", "a")], "", true),
            node(3, "input", &[("id", "b")], "", true),
        ];
        let desc = descriptor(&["E-Mail", "Email"], &[]);
        let hit = LabelExactStrategy.locate(&dom, &desc, TargetKind::Input);
        assert_eq!(hit, Some(2));
    }

    #[test]
    fn hidden_following_control_does_not_resolve_to_a_later_field() {
        let dom = vec![
            node(0, "label", &[], "E-Mail", true),
            node(1, "input", &[("name", "email")], "", false),
            node(2, "input", &[("name", "city")], "", true),
        ];
        let desc = descriptor(&["E-Mail"], &[]);
        assert_eq!(LabelExactStrategy.locate(&dom, &desc, TargetKind::Input), None);
    }

    #[test]
    fn hidden_for_target_is_no_match() {
        let dom = vec![
            node(0, "label", &[("for", "em")], "E-Mail", true),
            node(1, "input", &[("id", "em")], "", false),
        ];
        let desc = descriptor(&["E-Mail"], &[]);
        assert_eq!(LabelExactStrategy.locate(&dom, &desc, TargetKind::Input), None);
    }

    #[test]
    fn keyword_folds_case_and_umlauts() {
        let dom = vec![
            node(0, "input", &[("name", "Straße")], "", true),
            node(1, "input", &[("placeholder", "Hausnummer")], "", true),
        ];
        let desc = descriptor(&[], &["strasse"]);
        let hit = AttributeKeywordStrategy.locate(&dom, &desc, TargetKind::Input);
        assert_eq!(hit, Some(0));
    }

    #[test]
    fn keyword_order_beats_document_order() {
        let dom = vec![
            node(0, "input", &[("name", "secondary")], "", true),
            node(1, "input", &[("name", "primary")], "", true),
        ];
        let desc = descriptor(&[], &["primary", "secondary"]);
        let hit = AttributeKeywordStrategy.locate(&dom, &desc, TargetKind::Input);
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn keyword_skips_hidden_controls() {
        let dom = vec![
            node(0, "input", &[("name", "email")], "", false),
            node(1, "input", &[("aria-label", "E-Mail")], "", true),
        ];
        let desc = descriptor(&[], &["email", "e-mail"]);
        let hit = AttributeKeywordStrategy.locate(&dom, &desc, TargetKind::Input);
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn contenteditable_only_matches_text_targets() {
        let dom = vec![node(
            0,
            "div",
            &[("contenteditable", "true"), ("aria-label", "Kartennummer")],
            "",
            true,
        )];
        let desc = descriptor(&[], &["kartennummer"]);
        assert_eq!(
            ContenteditableStrategy.locate(&dom, &desc, TargetKind::Input),
            Some(0)
        );
        assert_eq!(
            ContenteditableStrategy.locate(&dom, &desc, TargetKind::Select),
            None
        );
    }

    #[test]
    fn select_target_only_matches_selects() {
        let dom = vec![
            node(0, "input", &[("name", "country")], "", true),
            node(1, "select", &[("name", "country")], "", true),
        ];
        let desc = descriptor(&[], &["country"]);
        let hit = AttributeKeywordStrategy.locate(&dom, &desc, TargetKind::Select);
        assert_eq!(hit, Some(1));
    }
}
