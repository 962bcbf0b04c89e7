//! Math embedding: wrap LaTeX parser output into paragraphs and runs.
//!
//! Block math keeps the parser's grouping: every run-group becomes its own
//! paragraph, so one `$$…$$` node can render as several stacked equations.
//! Inline math has to live inside the surrounding paragraph, so all groups
//! are flattened into a single run and the implied row breaks are dropped.

use crate::latex::LatexParser;
use crate::model::{Inline, MathRun, Paragraph};

/// One paragraph per run-group, in parser order.
pub fn block_math(parser: &dyn LatexParser, latex: &str) -> Vec<Paragraph> {
    parser
        .parse(latex)
        .into_iter()
        .map(|children| Paragraph::new(vec![Inline::Math(MathRun { children })]))
        .collect()
}

/// A single inline math run holding every group's atoms back to back.
pub fn inline_math(parser: &dyn LatexParser, latex: &str) -> Inline {
    Inline::Math(MathRun {
        children: parser.parse(latex).into_iter().flatten().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MathAtom, MathRunGroup};

    fn two_rows(_: &str) -> Vec<MathRunGroup> {
        vec![
            vec![MathAtom::text("a")],
            vec![MathAtom::text("b"), MathAtom::text("c")],
        ]
    }

    #[test]
    fn block_math_one_paragraph_per_group() {
        let paragraphs = block_math(&two_rows, "ignored");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(
            paragraphs[0].children,
            vec![Inline::Math(MathRun {
                children: vec![MathAtom::text("a")]
            })]
        );
        assert_eq!(
            paragraphs[1].children,
            vec![Inline::Math(MathRun {
                children: vec![MathAtom::text("b"), MathAtom::text("c")]
            })]
        );
    }

    #[test]
    fn inline_math_flattens_groups() {
        let run = inline_math(&two_rows, "ignored");
        assert_eq!(
            run,
            Inline::Math(MathRun {
                children: vec![MathAtom::text("a"), MathAtom::text("b"), MathAtom::text("c")]
            })
        );
    }

    #[test]
    fn superscript_stays_single_run() {
        let parser = |_: &str| {
            vec![vec![MathAtom::SuperScript {
                base: vec![MathAtom::text("x")],
                superscript: vec![MathAtom::text("2")],
            }]]
        };
        match inline_math(&parser, "x^2") {
            Inline::Math(run) => assert_eq!(run.children.len(), 1),
            other => panic!("expected math run, got {other:?}"),
        }
    }
}
