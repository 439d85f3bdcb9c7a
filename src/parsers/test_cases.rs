// Test-case parser - extracts structured records from generated markdown
//
// The markdown mini-format is defined as data (delimiter pattern + label
// table) so prompt-template changes only require updating the grammar, not
// scattered pattern literals. The parser is total: arbitrary input yields
// records or an empty list, never an error.

use crate::models::TestCaseRecord;
use regex::Regex;
use std::sync::OnceLock;

/// Named sections recognized inside a test case block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Priority,
    Preconditions,
    Steps,
    ExpectedResult,
}

/// The versioned grammar of the generated markdown
pub struct TestCaseGrammar {
    /// Matches both the inline `Test Case N` and the `### Test Case N`
    /// heading conventions, capturing the case number
    delimiter: Regex,
    labels: Vec<(Field, Regex)>,
}

static GRAMMAR: OnceLock<TestCaseGrammar> = OnceLock::new();

fn grammar() -> &'static TestCaseGrammar {
    GRAMMAR.get_or_init(|| {
        let label = |name: &str| {
            // Tolerates bullets, heading markers and bold around the label,
            // with the colon inside or outside the bold markers
            Regex::new(&format!(
                r"(?mi)^[ \t]*(?:[-*][ \t]+)?(?:#{{1,6}}[ \t]*)?(?:\*\*)?{}(?:\*\*)?[ \t]*:?[ \t]*(?:\*\*)?[ \t]*",
                name
            ))
            .unwrap()
        };

        TestCaseGrammar {
            delimiter: Regex::new(
                r"(?mi)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*)?[ \t]*Test Case[ \t]+(\d+)(?:\*\*)?[ \t]*[:.\-]?",
            )
            .unwrap(),
            labels: vec![
                (Field::Priority, label("Priority")),
                (Field::Preconditions, label(r"Pre-?conditions?")),
                (Field::Steps, label(r"(?:Test[ \t]+)?Steps")),
                (Field::ExpectedResult, label(r"Expected[ \t]+Results?(?:\(s\))?")),
            ],
        }
    })
}

/// Parse generated markdown into ordered test-case records.
///
/// Text before the first delimiter is discarded; a block missing a label
/// yields an empty string for that field. Record order matches block order.
pub fn parse_test_cases(markdown: &str) -> Vec<TestCaseRecord> {
    grammar().parse(markdown)
}

impl TestCaseGrammar {
    fn parse(&self, markdown: &str) -> Vec<TestCaseRecord> {
        // (start, end-of-delimiter, case number)
        let delimiters: Vec<(usize, usize, Option<u32>)> = self
            .delimiter
            .captures_iter(markdown)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let number = cap.get(1).and_then(|m| m.as_str().parse().ok());
                Some((whole.start(), whole.end(), number))
            })
            .collect();

        if delimiters.is_empty() {
            return Vec::new();
        }

        delimiters
            .iter()
            .enumerate()
            .map(|(i, &(_, content_start, number))| {
                let block_end = delimiters
                    .get(i + 1)
                    .map(|&(start, _, _)| start)
                    .unwrap_or(markdown.len());
                let block = &markdown[content_start..block_end];
                self.parse_block(block, number.unwrap_or(i as u32 + 1))
            })
            .collect()
    }

    fn parse_block(&self, block: &str, id: u32) -> TestCaseRecord {
        // First occurrence of each recognized label, in source order
        let mut found: Vec<(Field, usize, usize)> = self
            .labels
            .iter()
            .filter_map(|(field, re)| re.find(block).map(|m| (*field, m.start(), m.end())))
            .collect();
        found.sort_by_key(|(_, start, _)| *start);

        // The first line before any label is the record title
        let title_end = found
            .first()
            .map(|(_, start, _)| *start)
            .unwrap_or(block.len());
        let title = block[..title_end]
            .lines()
            .find(|line| !line.trim().is_empty())
            .map(clean_text)
            .unwrap_or_default();

        let extract = |target: Field| -> String {
            found
                .iter()
                .position(|(field, _, _)| *field == target)
                .map(|idx| {
                    let (_, _, content_start) = found[idx];
                    let content_end = found
                        .get(idx + 1)
                        .map(|(_, start, _)| *start)
                        .unwrap_or(block.len());
                    clean_text(&block[content_start..content_end])
                })
                .unwrap_or_default()
        };

        TestCaseRecord {
            id,
            title,
            priority: extract(Field::Priority),
            preconditions: extract(Field::Preconditions),
            steps: extract(Field::Steps),
            expected_result: extract(Field::ExpectedResult),
        }
    }
}

/// Strip markdown markup down to plain text: heading, bold/italic, bullet
/// and code/quote punctuation removed, numbered steps flattened, blank-line
/// runs collapsed to single newlines.
fn clean_text(text: &str) -> String {
    static LINE_PREFIX: OnceLock<Regex> = OnceLock::new();
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static EMPHASIS: OnceLock<Regex> = OnceLock::new();
    static UNDERSCORE_EMPHASIS: OnceLock<Regex> = OnceLock::new();
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();

    // Heading markers, blockquotes, bullets and step numbering at line start
    let line_prefix = LINE_PREFIX.get_or_init(|| {
        Regex::new(r"^(?:#{1,6}[ \t]+|>[ \t]*|[-*•][ \t]+|\d+[ \t]*[.)][ \t]+)+").unwrap()
    });
    let bold = BOLD.get_or_init(|| Regex::new(r"\*\*([^*]*)\*\*|__([^_]*)__").unwrap());
    let emphasis = EMPHASIS.get_or_init(|| Regex::new(r"\*([^*\n]*)\*").unwrap());
    // Word boundaries keep snake_case identifiers in step text intact
    let underscore_emphasis =
        UNDERSCORE_EMPHASIS.get_or_init(|| Regex::new(r"\b_([^_\n]+)_\b").unwrap());
    let blank_run = BLANK_RUN.get_or_init(|| Regex::new(r"\n[ \t]*\n+").unwrap());

    let lines: Vec<String> = text
        .lines()
        .map(|line| line_prefix.replace(line.trim_start(), "").trim_end().to_string())
        .collect();

    let mut joined = lines.join("\n");
    joined = bold.replace_all(&joined, "$1$2").into_owned();
    joined = emphasis.replace_all(&joined, "$1").into_owned();
    joined = underscore_emphasis.replace_all(&joined, "$1").into_owned();
    joined = joined.replace(['*', '`'], "");
    joined = blank_run.replace_all(&joined, "\n").into_owned();
    joined.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_DOCUMENT: &str = r#"Here are the test cases for the issue:

### Test Case 1: Login with valid credentials
**Priority:** High
**Preconditions:** A registered user exists
**Steps:**
1. Open the login page
2. Enter valid credentials
3. Click **Login**
**Expected Result:** The dashboard is shown

### Test Case 2: Login with wrong password
**Priority:** Medium
**Preconditions:** A registered user exists
**Steps:**
1. Open the login page
2. Enter a wrong password
**Expected Result:** An error message appears

### Test Case 3: Login with locked account
**Priority:** Low
**Preconditions:** The account is locked
**Steps:**
- Open the login page
- Enter credentials for the locked account
**Expected Result:** A lockout notice appears
"#;

    #[test]
    fn test_three_blocks_round_trip() {
        let records = parse_test_cases(FULL_DOCUMENT);
        assert_eq!(records.len(), 3);

        // Original order, ids from the delimiter
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].id, 2);
        assert_eq!(records[2].id, 3);
        assert_eq!(records[0].title, "Login with valid credentials");
        assert_eq!(records[2].title, "Login with locked account");

        for record in &records {
            // All five fields populated and free of markup
            for field in [
                &record.title,
                &record.priority,
                &record.preconditions,
                &record.steps,
                &record.expected_result,
            ] {
                assert!(!field.is_empty());
                assert!(!field.contains('#'), "unexpected '#' in {:?}", field);
                assert!(!field.contains('*'), "unexpected '*' in {:?}", field);
                for line in field.lines() {
                    assert!(!line.trim_start().starts_with('-'));
                }
            }
        }

        assert_eq!(records[0].priority, "High");
        assert_eq!(records[1].expected_result, "An error message appears");
    }

    #[test]
    fn test_parser_is_total_on_arbitrary_input() {
        assert!(parse_test_cases("").is_empty());
        assert!(parse_test_cases("no delimiters anywhere").is_empty());
        assert!(parse_test_cases("# A heading\n\nSome *markdown* text").is_empty());
        assert!(parse_test_cases("Test Case without a number").is_empty());
        assert!(parse_test_cases("\u{0}\u{1}binary-ish\u{2} garbage").is_empty());
    }

    #[test]
    fn test_inline_delimiter_convention() {
        let markdown = "Test Case 1: First title\nPriority: High\n\nTest Case 2: Second title\nPriority: Low\n";
        let records = parse_test_cases(markdown);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "First title");
        assert_eq!(records[0].priority, "High");
        assert_eq!(records[1].title, "Second title");
    }

    #[test]
    fn test_preamble_is_discarded() {
        let records = parse_test_cases(FULL_DOCUMENT);
        assert!(!records[0].title.contains("Here are the test cases"));
    }

    #[test]
    fn test_missing_labels_yield_empty_fields() {
        let markdown = "### Test Case 1: Only a title\nSome free text without labels\n";
        let records = parse_test_cases(markdown);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Only a title");
        assert_eq!(records[0].priority, "");
        assert_eq!(records[0].preconditions, "");
        assert_eq!(records[0].steps, "");
        assert_eq!(records[0].expected_result, "");
    }

    #[test]
    fn test_numbered_steps_are_flattened() {
        let records = parse_test_cases(FULL_DOCUMENT);
        assert_eq!(
            records[0].steps,
            "Open the login page\nEnter valid credentials\nClick Login"
        );
        // Bulleted steps flatten the same way
        assert_eq!(
            records[2].steps,
            "Open the login page\nEnter credentials for the locked account"
        );
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let markdown =
            "Test Case 1: Title\nPRIORITY: high\npreconditions: none\nSTEPS: do it\nexpected result: works\n";
        let records = parse_test_cases(markdown);
        assert_eq!(records[0].priority, "high");
        assert_eq!(records[0].preconditions, "none");
        assert_eq!(records[0].steps, "do it");
        assert_eq!(records[0].expected_result, "works");
    }

    #[test]
    fn test_expected_results_plural_and_parenthesized() {
        for label in ["Expected Result", "Expected Results", "Expected Result(s)"] {
            let markdown = format!("Test Case 1: Title\n{}: all good\n", label);
            let records = parse_test_cases(&markdown);
            assert_eq!(records[0].expected_result, "all good", "label {}", label);
        }
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let markdown =
            "Test Case 1: Title\nPreconditions: first\n\n\n\nsecond\nSteps: step one\n";
        let records = parse_test_cases(markdown);
        assert_eq!(records[0].preconditions, "first\nsecond");
    }

    #[test]
    fn test_case_number_is_taken_from_delimiter() {
        let markdown = "### Test Case 7: Renumbered by the model\nPriority: High\n";
        let records = parse_test_cases(markdown);
        assert_eq!(records[0].id, 7);
    }

    #[test]
    fn test_quote_and_code_punctuation_stripped() {
        let markdown =
            "Test Case 1: Title\nSteps:\n> 1. Run `cargo test`\n**Expected Result:** _clean_ output\n";
        let records = parse_test_cases(markdown);
        assert_eq!(records[0].steps, "Run cargo test");
        assert_eq!(records[0].expected_result, "clean output");
    }

    #[test]
    fn test_snake_case_identifiers_survive_cleaning() {
        let markdown = "Test Case 1: Title\nSteps: Set the user_name_field to empty\n";
        let records = parse_test_cases(markdown);
        assert_eq!(records[0].steps, "Set the user_name_field to empty");
    }
}
