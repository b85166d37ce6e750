//! Runtime element tree the picker resolves pointer targets against.
//!
//! An arena with parent links: the picker only ever walks upward, so
//! children are not indexed.

use std::collections::BTreeMap;

use crate::domain::source_tag::SOURCE_FILE_ATTR;
use crate::domain::source_tag::SourceTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct DomElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<DomElement>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element under `parent` (or as a root) and returns its id.
    pub fn append(&mut self, parent: Option<NodeId>, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomElement {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            parent: parent.filter(|p| p.0 < id.0),
        });
        id
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            element.attributes.insert(name.to_string(), value.into());
        }
    }

    /// Writes all three provenance attributes, as a tagged build would.
    pub fn set_source_tag(&mut self, node: NodeId, tag: &SourceTag) {
        for (name, value) in tag.to_attributes() {
            self.set_attribute(node, name, value);
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node.0)
            .and_then(|element| element.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Lowercased tag name, e.g. `button`.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|element| element.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|element| element.parent)
    }

    /// `node` followed by each ancestor up to its root.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.contains(node).then_some(node),
        }
    }

    /// Nearest inclusive ancestor matching `predicate`.
    pub fn closest<P>(&self, node: NodeId, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Document, NodeId) -> bool,
    {
        self.ancestors(node).find(|&id| predicate(self, id))
    }

    /// Nearest inclusive ancestor carrying a readable provenance tag.
    pub fn closest_tagged(&self, node: NodeId) -> Option<(NodeId, SourceTag)> {
        self.ancestors(node).find_map(|id| {
            if !self.has_attribute(id, SOURCE_FILE_ATTR) {
                return None;
            }
            SourceTag::from_attributes(|name| self.attribute(id, name)).map(|tag| (id, tag))
        })
    }
}

pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}
