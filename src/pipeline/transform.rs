//! The context-threaded transformer: mdast nodes → paragraphs and runs.
//!
//! A single recursive walk over the tree. Every call receives a [`Context`]
//! by reference and derives its children's context by copying it with one
//! field overridden; nothing is ever written back, so siblings can never see
//! each other's decoration, indent or list state.
//!
//! Dispatch is an exhaustive `match` over [`Node`]. Footnote definitions are
//! returned alongside the content in [`Converted`] and merged upward in
//! document order, a later definition replacing an earlier one with the same
//! identifier.

use crate::error::Md2DocxError;
use crate::latex::LatexParser;
use crate::mdast::{FootnoteDefinition, Heading, Link, List, ListItem, Node};
use crate::model::{
    twips_from_inches, Footnote, Footnotes, HeadingStyle, ImageMap, ImageRun, Indent, Inline,
    NumberingRef, Paragraph, TextRun,
};
use crate::pipeline::assemble::{MAX_LIST_LEVEL, ORDERED_LIST_REF};
use crate::pipeline::math;
use tracing::debug;

/// Left offset added per blockquote level, in inches.
pub const INDENT_STEP_INCHES: f64 = 0.5;

/// Placeholder text that replaces every table.
pub const TABLE_PLACEHOLDER: &str = "[TABLE]";

// ── Context ──────────────────────────────────────────────────────────────

/// Inline formatting flags. Only ever added to on the way down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoration {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
}

impl Decoration {
    fn run(self, text: impl Into<String>) -> TextRun {
        TextRun {
            text: text.into(),
            bold: self.bold,
            italics: self.italic,
            strike: self.strikethrough,
            breaks: 0,
        }
    }
}

/// The innermost enclosing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListInfo {
    /// Nesting depth; 0 for a top-level list.
    pub level: u32,
    pub ordered: bool,
    /// Task-list state of the current item, if it is a task item.
    pub checked: Option<bool>,
}

/// Immutable state threaded through the walk.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub decoration: Decoration,
    pub indent: u32,
    pub list: Option<ListInfo>,
    pub images: &'a ImageMap,
}

impl<'a> Context<'a> {
    /// The context for the document root.
    pub fn root(images: &'a ImageMap) -> Self {
        Self {
            decoration: Decoration::default(),
            indent: 0,
            list: None,
            images,
        }
    }

    fn with_decoration(&self, decoration: Decoration) -> Self {
        Self { decoration, ..*self }
    }

    fn indented(&self) -> Self {
        Self {
            indent: self.indent + 1,
            ..*self
        }
    }

    fn with_list(&self, list: ListInfo) -> Self {
        Self {
            list: Some(list),
            ..*self
        }
    }

    fn with_checked(&self, checked: Option<bool>) -> Self {
        Self {
            list: self.list.map(|list| ListInfo { checked, ..list }),
            ..*self
        }
    }
}

// ── Output ───────────────────────────────────────────────────────────────

/// A converted piece of content: a whole paragraph or a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Block(Paragraph),
    Inline(Inline),
}

/// The result of converting a node sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Converted {
    pub content: Vec<Content>,
    pub footnotes: Footnotes,
}

impl Converted {
    fn block(&mut self, paragraph: Paragraph) {
        self.content.push(Content::Block(paragraph));
    }

    fn inline(&mut self, inline: Inline) {
        self.content.push(Content::Inline(inline));
    }

    /// Take over a child's footnotes; later definitions win.
    fn merge_footnotes(&mut self, footnotes: Footnotes) {
        for (id, footnote) in footnotes {
            self.define_footnote(id, footnote);
        }
    }

    fn define_footnote(&mut self, id: String, footnote: Footnote) {
        if self.footnotes.insert(id.clone(), footnote).is_some() {
            debug!("Footnote '{}' redefined; keeping the later definition", id);
        }
    }
}

/// Group content into paragraphs, wrapping runs that sit at block level.
///
/// Consecutive stray runs share one implicit paragraph.
pub fn into_paragraphs(content: Vec<Content>) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut pending: Vec<Inline> = Vec::new();

    for item in content {
        match item {
            Content::Block(paragraph) => {
                if !pending.is_empty() {
                    paragraphs.push(Paragraph::new(std::mem::take(&mut pending)));
                }
                paragraphs.push(paragraph);
            }
            Content::Inline(inline) => pending.push(inline),
        }
    }
    if !pending.is_empty() {
        paragraphs.push(Paragraph::new(pending));
    }
    paragraphs
}

/// Flatten content into runs, splicing any paragraph's runs in place.
fn into_inlines(content: Vec<Content>) -> Vec<Inline> {
    let mut inlines = Vec::with_capacity(content.len());
    for item in content {
        match item {
            Content::Block(paragraph) => inlines.extend(paragraph.children),
            Content::Inline(inline) => inlines.push(inline),
        }
    }
    inlines
}

// ── Transformer ──────────────────────────────────────────────────────────

/// Converts mdast nodes under a [`Context`].
pub struct Transformer<'a> {
    latex: &'a dyn LatexParser,
}

impl<'a> Transformer<'a> {
    pub fn new(latex: &'a dyn LatexParser) -> Self {
        Self { latex }
    }

    /// Convert a node sequence. Pure: the same nodes and context always give
    /// the same result.
    pub fn convert(&self, nodes: &[Node], ctx: &Context<'_>) -> Result<Converted, Md2DocxError> {
        let mut out = Converted::default();
        for node in nodes {
            self.convert_node(node, ctx, &mut out)?;
        }
        Ok(out)
    }

    /// Convert `nodes` and append the result to `out`.
    fn convert_into(
        &self,
        nodes: &[Node],
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<(), Md2DocxError> {
        let Converted { content, footnotes } = self.convert(nodes, ctx)?;
        out.content.extend(content);
        out.merge_footnotes(footnotes);
        Ok(())
    }

    /// Convert `nodes` as the runs of an inline container.
    fn convert_inlines(
        &self,
        nodes: &[Node],
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<Vec<Inline>, Md2DocxError> {
        let Converted { content, footnotes } = self.convert(nodes, ctx)?;
        out.merge_footnotes(footnotes);
        Ok(into_inlines(content))
    }

    fn convert_node(
        &self,
        node: &Node,
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<(), Md2DocxError> {
        match node {
            Node::Paragraph(p) => {
                let paragraph = self.build_paragraph(&p.children, ctx, out)?;
                out.block(paragraph);
            }
            Node::Heading(heading) => {
                let paragraph = self.build_heading(heading, ctx, out)?;
                out.block(paragraph);
            }
            Node::ThematicBreak(_) => out.block(Paragraph {
                thematic_break: true,
                ..Paragraph::default()
            }),
            Node::Blockquote(quote) => self.convert_into(&quote.children, &ctx.indented(), out)?,
            Node::List(list) => self.build_list(list, ctx, out)?,
            Node::ListItem(_) => {
                return Err(Md2DocxError::UnexpectedNode {
                    node: "listItem",
                    position: "outside a list",
                })
            }
            Node::Table(_) => out.block(Paragraph::new(vec![Inline::Text(TextRun {
                text: TABLE_PLACEHOLDER.to_string(),
                bold: true,
                ..TextRun::default()
            })])),
            Node::TableRow(_) | Node::TableCell(_) => {
                return Err(Md2DocxError::UnexpectedNode {
                    node: node.kind(),
                    position: "outside a table",
                })
            }
            Node::Html(literal) => out.block(plain_paragraph(&literal.value)),
            Node::Code(code) => out.block(plain_paragraph(&code.value)),
            Node::Yaml(_)
            | Node::Toml(_)
            | Node::Definition(_)
            | Node::LinkReference(_)
            | Node::ImageReference(_) => {}
            Node::FootnoteDefinition(definition) => {
                self.build_footnote_definition(definition, ctx, out)?
            }
            Node::Math(math) => {
                for paragraph in math::block_math(self.latex, &math.value) {
                    out.block(paragraph);
                }
            }
            Node::Text(literal) => out.inline(Inline::Text(ctx.decoration.run(&literal.value))),
            Node::Emphasis(parent) => {
                let decoration = Decoration {
                    italic: true,
                    ..ctx.decoration
                };
                self.convert_into(&parent.children, &ctx.with_decoration(decoration), out)?
            }
            Node::Strong(parent) => {
                let decoration = Decoration {
                    bold: true,
                    ..ctx.decoration
                };
                self.convert_into(&parent.children, &ctx.with_decoration(decoration), out)?
            }
            Node::Delete(parent) => {
                let decoration = Decoration {
                    strikethrough: true,
                    ..ctx.decoration
                };
                self.convert_into(&parent.children, &ctx.with_decoration(decoration), out)?
            }
            Node::InlineCode(literal) => out.inline(Inline::Text(TextRun::plain(&literal.value))),
            Node::Break(_) => out.inline(Inline::Text(TextRun::line_break())),
            Node::Link(link) => {
                let hyperlink = self.build_link(link, ctx, out)?;
                out.inline(hyperlink);
            }
            Node::Image(image) => {
                let data = ctx.images.get(&image.url).ok_or_else(|| {
                    Md2DocxError::ImageNotResolved {
                        url: image.url.clone(),
                    }
                })?;
                out.inline(Inline::Image(ImageRun {
                    data: data.data.clone(),
                    width: data.width,
                    height: data.height,
                }));
            }
            Node::FootnoteReference(reference) => {
                let id = reference.identifier.parse::<u32>().map_err(|_| {
                    Md2DocxError::InvalidFootnoteIdentifier {
                        identifier: reference.identifier.clone(),
                    }
                })?;
                out.inline(Inline::FootnoteReference { id });
            }
            Node::InlineMath(literal) => out.inline(math::inline_math(self.latex, &literal.value)),
        }
        Ok(())
    }

    fn build_paragraph(
        &self,
        children: &[Node],
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<Paragraph, Md2DocxError> {
        let mut runs = self.convert_inlines(children, ctx, out)?;

        if let Some(checked) = ctx.list.and_then(|list| list.checked) {
            runs.insert(0, Inline::CheckBox { checked });
        }

        Ok(Paragraph {
            indent: (ctx.indent > 0).then(|| Indent {
                start: twips_from_inches(INDENT_STEP_INCHES * f64::from(ctx.indent)),
                hanging: None,
            }),
            numbering: ctx
                .list
                .filter(|list| list.ordered)
                .map(|list| NumberingRef {
                    reference: ORDERED_LIST_REF.to_string(),
                    level: list.level.min(MAX_LIST_LEVEL),
                }),
            children: runs,
            ..Paragraph::default()
        })
    }

    fn build_heading(
        &self,
        heading: &Heading,
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<Paragraph, Md2DocxError> {
        let style = match heading.depth {
            1 => HeadingStyle::Title,
            2 => HeadingStyle::Heading1,
            3 => HeadingStyle::Heading2,
            4 => HeadingStyle::Heading3,
            5 => HeadingStyle::Heading4,
            6 => HeadingStyle::Heading5,
            depth => return Err(Md2DocxError::InvalidHeadingDepth { depth }),
        };
        Ok(Paragraph {
            heading: Some(style),
            children: self.convert_inlines(&heading.children, ctx, out)?,
            ..Paragraph::default()
        })
    }

    /// Every list renders numbered, whatever its `ordered` flag says.
    /// `start` and `spread` are not applied.
    fn build_list(
        &self,
        list: &List,
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<(), Md2DocxError> {
        let info = ListInfo {
            level: ctx.list.map_or(0, |enclosing| enclosing.level + 1),
            ordered: true,
            checked: None,
        };
        let list_ctx = ctx.with_list(info);

        for child in &list.children {
            match child {
                Node::ListItem(item) => self.build_list_item(item, &list_ctx, out)?,
                other => {
                    return Err(Md2DocxError::UnexpectedNode {
                        node: other.kind(),
                        position: "directly inside a list",
                    })
                }
            }
        }
        Ok(())
    }

    /// The item's checkbox goes to its first direct paragraph only.
    fn build_list_item(
        &self,
        item: &ListItem,
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<(), Md2DocxError> {
        let mut checked = item.checked;

        for child in &item.children {
            if let Node::Paragraph(_) = child {
                self.convert_node(child, &ctx.with_checked(checked), out)?;
                checked = None;
            } else {
                self.convert_node(child, &ctx.with_checked(None), out)?;
            }
        }
        Ok(())
    }

    fn build_link(
        &self,
        link: &Link,
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<Inline, Md2DocxError> {
        Ok(Inline::Hyperlink {
            link: link.url.clone(),
            children: self.convert_inlines(&link.children, ctx, out)?,
        })
    }

    fn build_footnote_definition(
        &self,
        definition: &FootnoteDefinition,
        ctx: &Context<'_>,
        out: &mut Converted,
    ) -> Result<(), Md2DocxError> {
        let Converted { content, footnotes } = self.convert(&definition.children, ctx)?;
        out.merge_footnotes(footnotes);
        out.define_footnote(
            definition.identifier.clone(),
            Footnote {
                children: into_paragraphs(content),
            },
        );
        Ok(())
    }
}

fn plain_paragraph(value: &str) -> Paragraph {
    Paragraph::new(vec![Inline::Text(TextRun::plain(value))])
}
