//! The output document model handed to a [`crate::serialize::DocumentSerializer`].
//!
//! The model mirrors the shape of a WordprocessingML document without
//! committing to its XML: a body of paragraphs, each holding runs, plus the
//! numbering definitions and footnotes the paragraphs refer to. Lengths are
//! in twips (1/1440 inch) as OOXML expects.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Resolved image data keyed by the URL that appeared in the tree.
pub type ImageMap = HashMap<String, ImageData>;

/// Footnote bodies keyed by their mdast identifier.
pub type Footnotes = BTreeMap<String, Footnote>;

/// One run-group returned by a LaTeX parser: the atoms of one equation.
pub type MathRunGroup = Vec<MathAtom>;

/// Convert inches to twips (points × 20), truncating.
///
/// The multiplication order matters: `0.35 * 1440.0` floors to 503, while
/// `0.35 * 72.0 * 20.0` floors to the expected 504.
pub fn twips_from_inches(inches: f64) -> u32 {
    (inches * 72.0 * 20.0).floor() as u32
}

// ── Document ─────────────────────────────────────────────────────────────

/// The complete converted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: DocumentMetadata,
    pub styles: DocumentStyles,
    pub body: Vec<Paragraph>,
    pub numbering: Vec<NumberingConfig>,
    pub footnotes: Footnotes,
}

/// Core properties copied verbatim into the package. Never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<u32>,
}

/// Document-wide default run style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStyles {
    pub font: String,
    pub size: String,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            size: "14pt".to_string(),
        }
    }
}

/// The body of one footnote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    pub children: Vec<Paragraph>,
}

// ── Paragraphs ───────────────────────────────────────────────────────────

/// A block-level paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub heading: Option<HeadingStyle>,
    pub thematic_break: bool,
    pub indent: Option<Indent>,
    pub numbering: Option<NumberingRef>,
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn new(children: Vec<Inline>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// Concatenated text of all text runs, hyperlinks included.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.children {
            inline.push_text(&mut out);
        }
        out
    }
}

/// The six fixed heading styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingStyle {
    Title,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
}

/// Paragraph indentation in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indent {
    pub start: u32,
    pub hanging: Option<u32>,
}

/// A paragraph's reference into the numbering table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    pub reference: String,
    pub level: u32,
}

// ── Inline runs ──────────────────────────────────────────────────────────

/// A run inside a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text(TextRun),
    Hyperlink { link: String, children: Vec<Inline> },
    Image(ImageRun),
    Math(MathRun),
    FootnoteReference { id: u32 },
    CheckBox { checked: bool },
}

impl Inline {
    fn push_text(&self, out: &mut String) {
        match self {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::Hyperlink { children, .. } => {
                for child in children {
                    child.push_text(out);
                }
            }
            Inline::Image(_)
            | Inline::Math(_)
            | Inline::FootnoteReference { .. }
            | Inline::CheckBox { .. } => {}
        }
    }
}

/// A styled span of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italics: bool,
    pub strike: bool,
    /// Line breaks emitted before the text.
    pub breaks: u32,
}

impl TextRun {
    /// An undecorated run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// An empty run carrying a single line break.
    pub fn line_break() -> Self {
        Self {
            breaks: 1,
            ..Self::default()
        }
    }
}

/// An embedded image at its natural pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRun {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// An equation embedded in a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MathRun {
    pub children: Vec<MathAtom>,
}

/// The math atoms a LaTeX parser may produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MathAtom {
    Text {
        text: String,
    },
    Fraction {
        numerator: Vec<MathAtom>,
        denominator: Vec<MathAtom>,
    },
    SuperScript {
        base: Vec<MathAtom>,
        superscript: Vec<MathAtom>,
    },
    SubScript {
        base: Vec<MathAtom>,
        subscript: Vec<MathAtom>,
    },
    SubSuperScript {
        base: Vec<MathAtom>,
        subscript: Vec<MathAtom>,
        superscript: Vec<MathAtom>,
    },
    Radical {
        degree: Vec<MathAtom>,
        children: Vec<MathAtom>,
    },
}

impl MathAtom {
    pub fn text(text: impl Into<String>) -> Self {
        MathAtom::Text { text: text.into() }
    }
}

// ── Images ───────────────────────────────────────────────────────────────

/// Image bytes plus natural dimensions, as returned by an image resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

// ── Numbering ────────────────────────────────────────────────────────────

/// A named abstract numbering definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingConfig {
    pub reference: String,
    pub levels: Vec<NumberingLevel>,
}

/// Marker format and layout of one list level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingLevel {
    pub level: u32,
    pub format: LevelFormat,
    pub text: String,
    pub alignment: Alignment,
    pub indent: Indent,
    pub spacing: Option<Spacing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelFormat {
    Decimal,
    LowerLetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Start,
}

/// Paragraph spacing in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacing {
    pub after: u32,
    pub line: u32,
}

/// Serialise byte buffers as standard base64 strings.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twips_truncate() {
        assert_eq!(twips_from_inches(0.5), 720);
        assert_eq!(twips_from_inches(0.35), 504);
        assert_eq!(twips_from_inches(0.139), 200);
        assert_eq!(twips_from_inches(0.1919), 276);
        assert_eq!(twips_from_inches(0.81), 1166);
    }

    #[test]
    fn image_bytes_serialise_as_base64() {
        let run = ImageRun {
            data: vec![0x89, b'P', b'N', b'G'],
            width: 2,
            height: 3,
        };
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["data"], "iVBORw==");
        let back: ImageRun = serde_json::from_value(json).unwrap();
        assert_eq!(back, run);
    }

    #[test]
    fn plain_text_walks_hyperlinks() {
        let p = Paragraph::new(vec![
            Inline::Text(TextRun::plain("see ")),
            Inline::Hyperlink {
                link: "https://example.com".into(),
                children: vec![Inline::Text(TextRun::plain("here"))],
            },
            Inline::FootnoteReference { id: 1 },
        ]);
        assert_eq!(p.plain_text(), "see here");
    }

    #[test]
    fn default_styles() {
        let styles = DocumentStyles::default();
        assert_eq!(styles.font, "Arial");
        assert_eq!(styles.size, "14pt");
    }
}
