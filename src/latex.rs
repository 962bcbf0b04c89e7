//! LaTeX parsing boundary.
//!
//! Turning LaTeX into math atoms is not this crate's job; any parser that
//! implements [`LatexParser`] can be plugged in via
//! [`crate::config::ConversionConfigBuilder::latex_parser`]. The converter
//! only relies on the shape of the result: an ordered list of run-groups,
//! one per equation row.

use crate::model::{MathAtom, MathRunGroup};

/// Parses a LaTeX source string into ordered run-groups of math atoms.
///
/// Implementations must be `Send + Sync` so one parser can be shared by
/// concurrent conversions.
pub trait LatexParser: Send + Sync {
    fn parse(&self, latex: &str) -> Vec<MathRunGroup>;
}

/// Fallback parser that keeps each row of the source as literal math text.
///
/// Rows are separated by `\\`. Blank rows are dropped; a source that is
/// entirely blank still yields one empty group so block math always produces
/// a paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainLatexParser;

impl LatexParser for PlainLatexParser {
    fn parse(&self, latex: &str) -> Vec<MathRunGroup> {
        let groups: Vec<MathRunGroup> = latex
            .split("\\\\")
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| vec![MathAtom::text(row)])
            .collect();

        if groups.is_empty() {
            vec![Vec::new()]
        } else {
            groups
        }
    }
}

impl<F> LatexParser for F
where
    F: Fn(&str) -> Vec<MathRunGroup> + Send + Sync,
{
    fn parse(&self, latex: &str) -> Vec<MathRunGroup> {
        self(latex)
    }
}
