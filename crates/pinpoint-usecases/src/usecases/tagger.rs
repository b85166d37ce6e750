//! Build-time provenance tagging.
//!
//! Runs once per element opening in a source file and appends the file,
//! line and column attributes. An element that already carries any one of
//! them is treated as author-controlled and left alone.

use pinpoint_domain::JsxAttribute;
use pinpoint_domain::PROVENANCE_ATTRS;
use pinpoint_domain::SourceTag;
use pinpoint_domain::SyntaxElement;
use pinpoint_domain::SyntaxNode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("syntax tree is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode tagged tree: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Tagged,
    /// At least one provenance attribute was already present.
    AlreadyTagged,
    /// Generated element with no source position.
    NoPosition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagStats {
    pub tagged: usize,
    pub already_tagged: usize,
    pub no_position: usize,
}

impl TagStats {
    fn record(&mut self, outcome: TagOutcome) {
        match outcome {
            TagOutcome::Tagged => self.tagged += 1,
            TagOutcome::AlreadyTagged => self.already_tagged += 1,
            TagOutcome::NoPosition => self.no_position += 1,
        }
    }

    pub fn elements(&self) -> usize {
        self.tagged + self.already_tagged + self.no_position
    }
}

/// Tags the elements of one source file.
#[derive(Debug, Clone)]
pub struct SourceTagger {
    file: String,
}

impl SourceTagger {
    /// `file` is recorded verbatim, exactly as the build reports it.
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn tag_element(&self, element: &mut SyntaxElement) -> TagOutcome {
        let Some(position) = element.position else {
            return TagOutcome::NoPosition;
        };
        if PROVENANCE_ATTRS.iter().any(|name| element.has_attribute(name)) {
            return TagOutcome::AlreadyTagged;
        }
        let tag = SourceTag::new(self.file.clone(), position.line, position.column);
        for (name, value) in tag.to_attributes() {
            element.attributes.push(JsxAttribute::literal(name, value));
        }
        TagOutcome::Tagged
    }

    /// Visits every element under `root`, including `root` itself.
    pub fn tag_tree(&self, root: &mut SyntaxNode) -> TagStats {
        let mut stats = TagStats::default();
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            if let SyntaxNode::Element(element) = &mut *node {
                stats.record(self.tag_element(element));
            }
            if let Some(children) = node.children_mut() {
                pending.extend(children.iter_mut());
            }
        }
        stats
    }

    /// Tags a JSON-encoded tree and returns it re-encoded.
    pub fn tag_json(&self, input: &str) -> Result<(String, TagStats), TaggerError> {
        let mut tree: SyntaxNode = serde_json::from_str(input).map_err(TaggerError::Decode)?;
        let stats = self.tag_tree(&mut tree);
        let output = serde_json::to_string_pretty(&tree).map_err(TaggerError::Encode)?;
        Ok((output, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint_domain::SOURCE_COLUMN_ATTR;
    use pinpoint_domain::SOURCE_FILE_ATTR;
    use pinpoint_domain::SOURCE_LINE_ATTR;
    use proptest::prelude::*;

    const FILE: &str = "/app/src/Card.tsx";

    #[test]
    fn test_tags_positioned_element() {
        let tagger = SourceTagger::new(FILE);
        let mut element = SyntaxElement::new("div")
            .at(10, 4)
            .with_attribute(JsxAttribute::literal("className", "card"));

        assert_eq!(tagger.tag_element(&mut element), TagOutcome::Tagged);

        assert_eq!(element.attributes.len(), 4);
        assert_eq!(element.literal_attribute("className"), Some("card"));
        assert_eq!(element.literal_attribute(SOURCE_FILE_ATTR), Some(FILE));
        assert_eq!(element.literal_attribute(SOURCE_LINE_ATTR), Some("10"));
        assert_eq!(element.literal_attribute(SOURCE_COLUMN_ATTR), Some("4"));
        assert_eq!(element.attributes[1].name(), Some(SOURCE_FILE_ATTR));
    }

    #[test]
    fn test_manual_attribute_blocks_all_three() {
        let tagger = SourceTagger::new(FILE);
        let mut element = SyntaxElement::new("button")
            .at(3, 2)
            .with_attribute(JsxAttribute::literal(SOURCE_LINE_ATTR, "99"));

        assert_eq!(tagger.tag_element(&mut element), TagOutcome::AlreadyTagged);
        assert_eq!(element.attributes.len(), 1);
        assert!(!element.has_attribute(SOURCE_FILE_ATTR));
    }

    #[test]
    fn test_any_single_provenance_attribute_is_an_override() {
        let tagger = SourceTagger::new(FILE);
        for name in PROVENANCE_ATTRS {
            let mut element = SyntaxElement::new("span")
                .at(1, 0)
                .with_attribute(JsxAttribute::literal(name, "manual"));
            assert_eq!(tagger.tag_element(&mut element), TagOutcome::AlreadyTagged);
            assert_eq!(element.attributes.len(), 1);
        }

        let mut fresh = SyntaxElement::new("span").at(1, 0);
        tagger.tag_element(&mut fresh);
        let names: Vec<_> = fresh.attributes.iter().filter_map(|a| a.name()).collect();
        assert_eq!(names, PROVENANCE_ATTRS);
    }

    #[test]
    fn test_expression_valued_override_counts() {
        let tagger = SourceTagger::new(FILE);
        let mut element = SyntaxElement::new("span").at(1, 0).with_attribute(
            JsxAttribute::Named {
                name: SOURCE_FILE_ATTR.to_string(),
                value: Some(pinpoint_domain::AttributeValue::Expression {
                    expression: "props.file".into(),
                }),
            },
        );
        assert_eq!(tagger.tag_element(&mut element), TagOutcome::AlreadyTagged);
    }

    #[test]
    fn test_no_position_is_left_untouched() {
        let tagger = SourceTagger::new(FILE);
        let mut element = SyntaxElement::new("Generated");
        assert_eq!(tagger.tag_element(&mut element), TagOutcome::NoPosition);
        assert!(element.attributes.is_empty());
    }

    #[test]
    fn test_tag_tree_walks_fragments() {
        let tagger = SourceTagger::new(FILE);
        let mut tree = SyntaxNode::Fragment {
            children: vec![
                SyntaxElement::new("header")
                    .at(2, 4)
                    .with_child(SyntaxNode::text("title"))
                    .with_child(SyntaxElement::new("h1").at(3, 6))
                    .into(),
                SyntaxNode::Expression {
                    source: "items.map(render)".into(),
                },
                SyntaxElement::new("Slot").into(),
            ],
        };

        let stats = tagger.tag_tree(&mut tree);

        assert_eq!(
            stats,
            TagStats {
                tagged: 2,
                already_tagged: 0,
                no_position: 1
            }
        );
        let SyntaxNode::Fragment { children } = &tree else {
            panic!("expected fragment");
        };
        let SyntaxNode::Element(header) = &children[0] else {
            panic!("expected header");
        };
        let SyntaxNode::Element(h1) = &header.children[1] else {
            panic!("expected h1");
        };
        assert_eq!(h1.literal_attribute(SOURCE_LINE_ATTR), Some("3"));
    }

    #[test]
    fn test_tag_json_roundtrip() {
        let tagger = SourceTagger::new(FILE);
        let input = r#"{"type":"element","name":"p","position":{"line":7,"column":2}}"#;
        let (output, stats) = tagger.tag_json(input).unwrap();
        assert_eq!(stats.tagged, 1);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["attributes"][2]["name"], SOURCE_COLUMN_ATTR);
        assert_eq!(value["attributes"][2]["value"], "2");
    }

    #[test]
    fn test_tag_json_rejects_garbage() {
        let err = SourceTagger::new(FILE).tag_json("<div/>").unwrap_err();
        assert!(matches!(err, TaggerError::Decode(_)));
    }

    fn element_strategy() -> impl Strategy<Value = SyntaxNode> {
        let leaf = (1u32..500, 0u32..120, any::<bool>()).prop_map(|(line, column, positioned)| -> SyntaxNode {
            let element = SyntaxElement::new("span");
            if positioned {
                element.at(line, column).into()
            } else {
                element.into()
            }
        });
        leaf.prop_recursive(4, 32, 4, |inner| {
            (1u32..500, prop::collection::vec(inner, 0..4)).prop_map(|(line, children)| -> SyntaxNode {
                let mut element = SyntaxElement::new("div").at(line, 0);
                element.children = children;
                element.into()
            })
        })
    }

    proptest! {
        #[test]
        fn prop_tagging_is_idempotent(mut tree in element_strategy()) {
            let tagger = SourceTagger::new(FILE);
            let first = tagger.tag_tree(&mut tree);
            let after_first = tree.clone();
            let second = tagger.tag_tree(&mut tree);

            prop_assert_eq!(&tree, &after_first);
            prop_assert_eq!(second.tagged, 0);
            prop_assert_eq!(second.already_tagged, first.tagged);
            prop_assert_eq!(second.no_position, first.no_position);
        }
    }
}
