use crate::RejectReason;
use std::fmt;

/// Number of answer options every question must have
pub const OPTIONS_COUNT: usize = 4;

/// A single multiple-choice question that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestion {
    pub question: String,
    pub options: [String; OPTIONS_COUNT],

    /// Zero-based index into [`Self::options`], always less than [`OPTIONS_COUNT`]
    pub correct_index: u8,
}

/// Labelled fields of a question block in the order they must appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Question,
    OptionA,
    OptionB,
    OptionC,
    OptionD,
    CorrectAnswer,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Question,
        Field::OptionA,
        Field::OptionB,
        Field::OptionC,
        Field::OptionD,
        Field::CorrectAnswer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Question => "Question:",
            Field::OptionA => "A)",
            Field::OptionB => "B)",
            Field::OptionC => "C)",
            Field::OptionD => "D)",
            Field::CorrectAnswer => "Correct Answer:",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a single question block.
///
/// The block is read line by line. Each field starts on a line that begins
/// with the field's label (case-insensitive) and lasts until the line with the
/// next expected label. Lines before the `Question:` label are ignored.
pub fn parse_block(block: &str) -> Result<ParsedQuestion, RejectReason> {
    let mut values: [String; 6] = Default::default();
    let mut seen = 0;

    let lines = block.lines().map(str::trim).filter(|line| !line.is_empty());

    for line in lines {
        if let Some(&next) = Field::ALL.get(seen) {
            if let Some(rest) = strip_label(line, next.label()) {
                values[seen] = rest.trim_start().to_owned();
                seen += 1;
                continue;
            }
        }

        // Preamble before the first label has nowhere to go
        let Some(current) = seen.checked_sub(1) else {
            continue;
        };

        let value = &mut values[current];
        if !value.is_empty() {
            value.push('\n');
        }
        value.push_str(line);
    }

    if let Some(&field) = Field::ALL.get(seen) {
        return Err(RejectReason::MissingField { field });
    }

    let [question, a, b, c, d, answer] = values;

    for (field, value) in Field::ALL.iter().zip([&question, &a, &b, &c, &d]) {
        if value.is_empty() {
            return Err(RejectReason::EmptyField { field: *field });
        }
    }

    Ok(ParsedQuestion {
        question,
        options: [a, b, c, d],
        correct_index: answer_index(&answer)?,
    })
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    line.get(label.len()..)
}

/// Maps the letter of the correct answer to the option index: `A -> 0` .. `D -> 3`.
///
/// The letter may be followed by punctuation or the end of text, but not
/// by another letter or digit, so `B)` is accepted and `Both` is not.
fn answer_index(answer: &str) -> Result<u8, RejectReason> {
    let mut chars = answer.chars();
    let letter = chars.next().map(|char| char.to_ascii_uppercase());
    let glued = chars.next().is_some_and(char::is_alphanumeric);

    match letter {
        Some(letter @ 'A'..='D') if !glued => Ok(letter as u8 - b'A'),
        _ => Err(RejectReason::InvalidAnswer {
            input: answer.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    #[track_caller]
    fn check(block: &str, expected: Expect) {
        expected.assert_eq(&format!("{:?}", parse_block(block)));
    }

    #[test]
    fn well_formed() {
        check(
            "Question: What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nCorrect Answer: B",
            expect![[r#"Ok(ParsedQuestion { question: "What is 2+2?", options: ["3", "4", "5", "6"], correct_index: 1 })"#]],
        );
    }

    #[test]
    fn labels_are_case_insensitive() {
        check(
            "QUESTION: Capital of France?\na) Rome\nb) Paris\nc) Berlin\nd) Madrid\ncorrect answer: b",
            expect![[r#"Ok(ParsedQuestion { question: "Capital of France?", options: ["Rome", "Paris", "Berlin", "Madrid"], correct_index: 1 })"#]],
        );
    }

    #[test]
    fn multiline_values_and_blank_lines() {
        check(
            "Here is your question:\n\n  Question:\n  Which one\n  is prime?\n\nA)   9\nB) 15\nC) 21\nD) 7\n\nCorrect Answer:\n D",
            expect![[r#"Ok(ParsedQuestion { question: "Which one\nis prime?", options: ["9", "15", "21", "7"], correct_index: 3 })"#]],
        );
    }

    #[test]
    fn trailing_lines_after_answer_are_ignored() {
        check(
            "Question: q\nA) a\nB) b\nC) c\nD) d\nCorrect Answer: A) a\nExplanation: because",
            expect![[r#"Ok(ParsedQuestion { question: "q", options: ["a", "b", "c", "d"], correct_index: 0 })"#]],
        );
    }

    #[test]
    fn missing_option() {
        check(
            "Question: q\nA) a\nB) b\nC) c\nCorrect Answer: A",
            expect!["Err(MissingField { field: OptionD })"],
        );
    }

    #[test]
    fn out_of_order_fields() {
        check(
            "Question: q\nB) b\nA) a\nC) c\nD) d\nCorrect Answer: A",
            expect!["Err(MissingField { field: OptionB })"],
        );
    }

    #[test]
    fn missing_question() {
        check(
            "A) a\nB) b\nC) c\nD) d\nCorrect Answer: A",
            expect!["Err(MissingField { field: Question })"],
        );
    }

    #[test]
    fn empty_option() {
        check(
            "Question: q\nA) a\nB)\nC) c\nD) d\nCorrect Answer: A",
            expect!["Err(EmptyField { field: OptionB })"],
        );
    }

    #[test]
    fn answer_letter_out_of_range() {
        check(
            "Question: q\nA) a\nB) b\nC) c\nD) d\nCorrect Answer: E",
            expect![[r#"Err(InvalidAnswer { input: "E" })"#]],
        );
    }

    #[test]
    fn answer_word_is_not_a_letter() {
        check(
            "Question: q\nA) a\nB) b\nC) c\nD) d\nCorrect Answer: Both",
            expect![[r#"Err(InvalidAnswer { input: "Both" })"#]],
        );
    }

    #[test]
    fn answer_is_absent() {
        check(
            "Question: q\nA) a\nB) b\nC) c\nD) d\nCorrect Answer:",
            expect![[r#"Err(InvalidAnswer { input: "" })"#]],
        );
    }

    #[test]
    fn every_letter_maps_to_its_index() {
        for (letter, expected) in ["A", "b", "C.", "d"].into_iter().zip(0..) {
            let block = format!("Question: q\nA) a\nB) b\nC) c\nD) d\nCorrect Answer: {letter}");
            let parsed = parse_block(&block).unwrap();
            assert_eq!(parsed.correct_index, expected);
            assert_eq!(parsed.options.len(), OPTIONS_COUNT);
        }
    }
}
