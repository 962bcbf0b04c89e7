//! The input tree: a parsed Markdown document in mdast shape.
//!
//! Producing this tree (parsing Markdown text) happens elsewhere: remark,
//! markdown-rs, or any tool that emits mdast JSON. This module only models the
//! closed set of node tags the converter understands and decodes them from
//! JSON. Positions and other unknown fields are ignored.
//!
//! [`Node`] is a closed enum. Adding a tag here without handling it in
//! [`crate::pipeline::transform`] is a compile error, so an unrecognised tag
//! can only ever fail at the decoding boundary (as
//! [`Md2DocxError::InvalidTree`]), never during conversion.

use crate::error::Md2DocxError;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// The document root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Decode an mdast tree from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, Md2DocxError> {
        serde_json::from_str(json).map_err(invalid_tree)
    }

    /// Decode an mdast tree from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Md2DocxError> {
        serde_json::from_value(value).map_err(invalid_tree)
    }

    /// Decode an mdast tree from a reader (file, stdin).
    pub fn from_reader(reader: impl Read) -> Result<Self, Md2DocxError> {
        serde_json::from_reader(reader).map_err(invalid_tree)
    }
}

fn invalid_tree(e: serde_json::Error) -> Md2DocxError {
    Md2DocxError::InvalidTree {
        detail: e.to_string(),
    }
}

/// One node of the tree, tagged by its mdast `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    // ── Block content ─────────────────────────────────────────────────────
    Paragraph(Parent),
    Heading(Heading),
    ThematicBreak(Empty),
    Blockquote(Parent),
    List(List),
    ListItem(ListItem),
    Table(Table),
    TableRow(Parent),
    TableCell(Parent),
    Html(Literal),
    Code(Code),
    Yaml(Literal),
    Toml(Literal),
    Definition(Definition),
    FootnoteDefinition(FootnoteDefinition),
    Math(Math),

    // ── Inline content ────────────────────────────────────────────────────
    Text(Literal),
    Emphasis(Parent),
    Strong(Parent),
    Delete(Parent),
    InlineCode(Literal),
    Break(Empty),
    Link(Link),
    Image(Image),
    LinkReference(LinkReference),
    ImageReference(ImageReference),
    FootnoteReference(FootnoteReference),
    InlineMath(Literal),
}

impl Node {
    /// The mdast tag name of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Paragraph(_) => "paragraph",
            Node::Heading(_) => "heading",
            Node::ThematicBreak(_) => "thematicBreak",
            Node::Blockquote(_) => "blockquote",
            Node::List(_) => "list",
            Node::ListItem(_) => "listItem",
            Node::Table(_) => "table",
            Node::TableRow(_) => "tableRow",
            Node::TableCell(_) => "tableCell",
            Node::Html(_) => "html",
            Node::Code(_) => "code",
            Node::Yaml(_) => "yaml",
            Node::Toml(_) => "toml",
            Node::Definition(_) => "definition",
            Node::FootnoteDefinition(_) => "footnoteDefinition",
            Node::Math(_) => "math",
            Node::Text(_) => "text",
            Node::Emphasis(_) => "emphasis",
            Node::Strong(_) => "strong",
            Node::Delete(_) => "delete",
            Node::InlineCode(_) => "inlineCode",
            Node::Break(_) => "break",
            Node::Link(_) => "link",
            Node::Image(_) => "image",
            Node::LinkReference(_) => "linkReference",
            Node::ImageReference(_) => "imageReference",
            Node::FootnoteReference(_) => "footnoteReference",
            Node::InlineMath(_) => "inlineMath",
        }
    }

    /// Child nodes, or an empty slice for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::TableRow(p)
            | Node::TableCell(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p) => &p.children,
            Node::Heading(h) => &h.children,
            Node::List(l) => &l.children,
            Node::ListItem(i) => &i.children,
            Node::Table(t) => &t.children,
            Node::FootnoteDefinition(f) => &f.children,
            Node::Link(l) => &l.children,
            Node::LinkReference(l) => &l.children,
            Node::ThematicBreak(_)
            | Node::Html(_)
            | Node::Code(_)
            | Node::Yaml(_)
            | Node::Toml(_)
            | Node::Definition(_)
            | Node::Math(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Break(_)
            | Node::Image(_)
            | Node::ImageReference(_)
            | Node::FootnoteReference(_)
            | Node::InlineMath(_) => &[],
        }
    }

    // ── Shorthand constructors ────────────────────────────────────────────

    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Literal::new(value))
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph(Parent { children })
    }

    pub fn emphasis(children: Vec<Node>) -> Self {
        Node::Emphasis(Parent { children })
    }

    pub fn strong(children: Vec<Node>) -> Self {
        Node::Strong(Parent { children })
    }

    pub fn delete(children: Vec<Node>) -> Self {
        Node::Delete(Parent { children })
    }

    pub fn heading(depth: u8, children: Vec<Node>) -> Self {
        Node::Heading(Heading { depth, children })
    }

    pub fn image(url: impl Into<String>) -> Self {
        Node::Image(Image {
            url: url.into(),
            title: None,
            alt: None,
        })
    }
}

/// Payload for nodes that only carry children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Payload for childless, valueless nodes (`thematicBreak`, `break`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

/// Payload for leaf nodes carrying a raw string value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    #[serde(default)]
    pub value: String,
}

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub depth: u8,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub ordered: Option<bool>,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub spread: Option<bool>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// `None` for an ordinary item; `Some` for a task-list item.
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub spread: Option<bool>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub align: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Code {
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub meta: Option<String>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Math {
    #[serde(default)]
    pub meta: Option<String>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootnoteDefinition {
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FootnoteReference {
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReference {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_remark_output() {
        let root = Root::from_value(json!({
            "type": "root",
            "children": [
                {
                    "type": "heading",
                    "depth": 2,
                    "children": [{ "type": "text", "value": "Section A" }],
                    "position": { "start": { "line": 1, "column": 1 } }
                },
                {
                    "type": "list",
                    "ordered": false,
                    "start": null,
                    "spread": false,
                    "children": [{
                        "type": "listItem",
                        "checked": true,
                        "children": [{ "type": "paragraph", "children": [] }]
                    }]
                },
                { "type": "thematicBreak" },
                { "type": "inlineMath", "value": "x^2" }
            ]
        }))
        .expect("valid mdast");

        assert_eq!(root.children.len(), 4);
        assert_eq!(root.children[0].kind(), "heading");
        match &root.children[1] {
            Node::List(list) => {
                assert_eq!(list.ordered, Some(false));
                match &list.children[0] {
                    Node::ListItem(item) => assert_eq!(item.checked, Some(true)),
                    other => panic!("expected listItem, got {}", other.kind()),
                }
            }
            other => panic!("expected list, got {}", other.kind()),
        }
        assert_eq!(root.children[2], Node::ThematicBreak(Empty {}));
    }

    #[test]
    fn unknown_tag_is_invalid_tree() {
        let err = Root::from_json(r#"{"children":[{"type":"marquee","value":"hi"}]}"#)
            .expect_err("unknown tag must fail");
        assert!(err.is_logic_violation());
        assert!(err.to_string().contains("marquee"), "got: {err}");
    }

    #[test]
    fn null_checked_is_none() {
        let root = Root::from_json(
            r#"{"children":[{"type":"listItem","checked":null,"children":[]}]}"#,
        )
        .unwrap();
        assert_eq!(
            root.children[0],
            Node::ListItem(ListItem {
                checked: None,
                spread: None,
                children: vec![],
            })
        );
    }

    #[test]
    fn children_of_leaf_is_empty() {
        assert!(Node::text("x").children().is_empty());
        assert_eq!(Node::strong(vec![Node::text("x")]).children().len(), 1);
    }
}
