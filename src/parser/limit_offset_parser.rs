use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use crate::parser::token_source::{next_non_whitespace, unquoted_keyword};

pub struct LimitOffsetParser;

impl LimitOffsetParser {
    pub fn parse(tokens: &[Token]) -> (Option<i64>, Option<i64>) {
        (
            Self::value_after(tokens, Keyword::LIMIT),
            Self::value_after(tokens, Keyword::OFFSET),
        )
    }

    // First occurrence wins. Only a bare digit run is accepted; anything
    // else leaves the clause unset.
    fn value_after(tokens: &[Token], keyword: Keyword) -> Option<i64> {
        let at = tokens
            .iter()
            .position(|token| unquoted_keyword(token) == Some(keyword))?;
        let value = next_non_whitespace(tokens, at + 1)?;

        let text = tokens[value].to_string();
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        text.parse::<i64>().ok()
    }
}
