//! Final assembly: converted content + footnotes + numbering → [`Document`].

use crate::model::{
    twips_from_inches, Alignment, Document, DocumentMetadata, DocumentStyles, Footnotes, Indent,
    LevelFormat, NumberingConfig, NumberingLevel, Spacing,
};
use crate::pipeline::transform::{into_paragraphs, Content};

/// Name of the single numbering definition every list paragraph refers to.
pub const ORDERED_LIST_REF: &str = "ordered";

/// Deepest defined numbering level. Deeper lists reuse its style.
pub const MAX_LIST_LEVEL: u32 = 5;

/// The fixed six-level numbering table.
///
/// Level 0 is `1.`, level 1 is `(a) `, levels 2–5 fall back to plain decimal
/// markers indented half an inch per level.
pub fn default_numbering() -> NumberingConfig {
    let top_spacing = Some(Spacing {
        after: twips_from_inches(0.139),
        line: twips_from_inches(0.1919),
    });

    let mut levels = vec![
        NumberingLevel {
            level: 0,
            format: LevelFormat::Decimal,
            text: "%1.".to_string(),
            alignment: Alignment::Start,
            indent: Indent {
                start: twips_from_inches(0.5),
                hanging: Some(twips_from_inches(0.35)),
            },
            spacing: top_spacing,
        },
        NumberingLevel {
            level: 1,
            format: LevelFormat::LowerLetter,
            text: "(%2) ".to_string(),
            alignment: Alignment::Start,
            indent: Indent {
                start: twips_from_inches(0.81),
                hanging: Some(twips_from_inches(0.31)),
            },
            spacing: top_spacing,
        },
    ];

    levels.extend((2..=MAX_LIST_LEVEL).map(|level| NumberingLevel {
        level,
        format: LevelFormat::Decimal,
        text: format!("%{}.", level + 1),
        alignment: Alignment::Start,
        indent: Indent {
            start: twips_from_inches(0.5 * f64::from(level)),
            hanging: None,
        },
        spacing: None,
    }));

    NumberingConfig {
        reference: ORDERED_LIST_REF.to_string(),
        levels,
    }
}

/// Build the document. Stray top-level runs are wrapped into paragraphs;
/// footnotes are kept whether or not anything cites them.
pub fn assemble(
    content: Vec<Content>,
    footnotes: Footnotes,
    metadata: DocumentMetadata,
    styles: DocumentStyles,
) -> Document {
    Document {
        metadata,
        styles,
        body: into_paragraphs(content),
        numbering: vec![default_numbering()],
        footnotes,
    }
}
