//! Minimal UI syntax tree as seen by the build-time tagger.
//!
//! The JSON encoding (`"type"` / `"kind"` tags) is what external parsers
//! emit when piping a tree through `pinpoint tag`.

use serde::Deserialize;
use serde::Serialize;

/// Start of an element in its source file. Line 1-based, column 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Literal(String),
    Expression { expression: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JsxAttribute {
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<AttributeValue>,
    },
    /// `{...props}`; has no name and never counts as an override.
    Spread { source: String },
}

impl JsxAttribute {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        JsxAttribute::Named {
            name: name.into(),
            value: Some(AttributeValue::Literal(value.into())),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            JsxAttribute::Named { name, .. } => Some(name),
            JsxAttribute::Spread { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxElement {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<JsxAttribute>,
    /// `None` for generated elements with no source mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
    #[serde(default)]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            position: None,
            children: Vec::new(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.position = Some(SourcePosition::new(line, column));
        self
    }

    pub fn with_attribute(mut self, attribute: JsxAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_child(mut self, child: impl Into<SyntaxNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name() == Some(name))
    }

    pub fn literal_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find_map(|attr| match attr {
            JsxAttribute::Named {
                name: attr_name,
                value: Some(AttributeValue::Literal(value)),
            } if attr_name == name => Some(value.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SyntaxNode {
    Element(SyntaxElement),
    Fragment { children: Vec<SyntaxNode> },
    Text { value: String },
    Expression { source: String },
}

impl SyntaxNode {
    pub fn text(value: impl Into<String>) -> Self {
        SyntaxNode::Text {
            value: value.into(),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<SyntaxNode>> {
        match self {
            SyntaxNode::Element(element) => Some(&mut element.children),
            SyntaxNode::Fragment { children } => Some(children),
            SyntaxNode::Text { .. } | SyntaxNode::Expression { .. } => None,
        }
    }
}

impl From<SyntaxElement> for SyntaxNode {
    fn from(element: SyntaxElement) -> Self {
        SyntaxNode::Element(element)
    }
}
