// Parsers for model output

pub mod test_cases;

pub use test_cases::{parse_test_cases, TestCaseGrammar};
