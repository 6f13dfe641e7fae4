//! Parser and validator for multiple-choice questions returned by a text
//! generation model in the following plain-text format:
//!
//! ```text
//! Question: What is 2+2?
//! A) 3
//! B) 4
//! C) 5
//! D) 6
//! Correct Answer: B
//! ---
//! Question: ...
//! ```
//!
//! Blocks that don't follow the format exactly are dropped, nothing is guessed.

mod block;
mod error;

pub use block::*;
pub use error::*;

/// Separator between question blocks in the raw text
pub const BLOCK_DELIMITER: &str = "---";

/// A block that didn't pass validation along with the reason for that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected<'a> {
    pub block: &'a str,
    pub reason: RejectReason,
}

#[derive(Debug, Default)]
pub struct ParseOutput<'a> {
    /// Valid questions in the same order as they appear in the input
    pub questions: Vec<ParsedQuestion>,
    pub rejected: Vec<Rejected<'a>>,
}

/// Splits the raw text into trimmed non-empty blocks separated by [`BLOCK_DELIMITER`].
pub fn split_blocks(blob: &str) -> impl Iterator<Item = &str> {
    blob.split(BLOCK_DELIMITER)
        .map(str::trim)
        .filter(|block| !block.is_empty())
}

/// Parses all valid questions from the raw text, silently skipping the invalid ones.
pub fn parse_blob(blob: &str) -> Vec<ParsedQuestion> {
    parse_blob_verbose(blob).questions
}

/// Same as [`parse_blob`], but also reports the blocks that were rejected.
pub fn parse_blob_verbose(blob: &str) -> ParseOutput<'_> {
    let mut output = ParseOutput::default();

    for block in split_blocks(blob) {
        match parse_block(block) {
            Ok(question) => output.questions.push(question),
            Err(reason) => output.rejected.push(Rejected { block, reason }),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn block(question: &str, answer: &str) -> String {
        format!("Question: {question}\nA) one\nB) two\nC) three\nD) four\nCorrect Answer: {answer}")
    }

    #[test]
    fn split_skips_empty_blocks() {
        let blocks: Vec<_> = split_blocks("\n---\n first \n---\n\n---\nsecond\n---").collect();
        expect![[r#"["first", "second"]"#]].assert_eq(&format!("{blocks:?}"));
    }

    #[test]
    fn every_well_formed_block_is_parsed_in_order() {
        let blocks: Vec<_> = (0..5).map(|i| block(&format!("q{i}"), "C")).collect();
        let blob = blocks.join("\n---\n");

        let questions = parse_blob(&blob);

        let actual: Vec<_> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(actual, ["q0", "q1", "q2", "q3", "q4"]);
        assert!(questions.iter().all(|q| q.correct_index == 2));
    }

    #[test]
    fn malformed_block_is_dropped_without_affecting_others() {
        let blob = format!(
            "{}\n---\nQuestion: q2\nA) one\nB) two\nC) three\nCorrect Answer: A",
            block("q1", "A"),
        );

        let output = parse_blob_verbose(&blob);

        expect![[r#"[ParsedQuestion { question: "q1", options: ["one", "two", "three", "four"], correct_index: 0 }]"#]]
            .assert_eq(&format!("{:?}", output.questions));

        expect!["[MissingField { field: OptionD }]"].assert_eq(&format!(
            "{:?}",
            output
                .rejected
                .iter()
                .map(|rejected| &rejected.reason)
                .collect::<Vec<_>>()
        ));
    }

    #[test]
    fn out_of_range_letter_yields_nothing() {
        assert!(parse_blob(&block("q", "E")).is_empty());
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(parse_blob("").is_empty());
        assert!(parse_blob("---\n---").is_empty());
        assert!(parse_blob("Sorry, I can't help with that.").is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let blob = [block("x", "a"), block("y", "Z"), block("z", "d")].join("---");
        assert_eq!(parse_blob(&blob), parse_blob(&blob));
        assert_eq!(parse_blob(&blob).len(), 2);
    }
}
