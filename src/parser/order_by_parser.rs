use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Word};

use crate::parser::token_source::{next_non_whitespace, unquoted_keyword};

pub struct OrderByParser;

impl OrderByParser {
    /// Collects ORDER BY fields from the raw stream, in order. Descending
    /// fields come back with a `-` prefix, ready for the sort list.
    ///
    /// The scan enters at `ORDER BY` and leaves at `LIMIT`, `OFFSET` or the
    /// end of the statement. `ASC` and commas are skipped; `DESC` rewrites
    /// the field before it and is a no-op when there is none.
    pub fn parse(tokens: &[Token]) -> Vec<String> {
        let mut fields: Vec<String> = vec![];
        let mut in_order_by = false;
        let mut i = 0;

        while i < tokens.len() {
            let keyword = unquoted_keyword(&tokens[i]);

            if !in_order_by {
                if keyword == Some(Keyword::ORDER) {
                    if let Some(by) = next_non_whitespace(tokens, i + 1) {
                        if unquoted_keyword(&tokens[by]) == Some(Keyword::BY) {
                            in_order_by = true;
                            i = by + 1;
                            continue;
                        }
                    }
                }
                i += 1;
                continue;
            }

            match &tokens[i] {
                Token::Whitespace(_) | Token::Comma => {}
                _ if keyword == Some(Keyword::LIMIT) || keyword == Some(Keyword::OFFSET) => break,
                Token::SemiColon => break,
                _ if keyword == Some(Keyword::ASC) => {}
                _ if keyword == Some(Keyword::DESC) => {
                    if let Some(last) = fields.last_mut() {
                        *last = format!("-{}", last);
                    }
                }
                Token::Word(word) => {
                    let (name, next) = Self::dotted_name(tokens, i, word);
                    fields.push(name);
                    i = next;
                    continue;
                }
                token => fields.push(token.to_string()),
            }
            i += 1;
        }

        fields
    }

    // a.b.c arrives split into words and periods; rejoin adjacent runs
    fn dotted_name(tokens: &[Token], i: usize, word: &Word) -> (String, usize) {
        let mut name = word.value.clone();
        let mut i = i + 1;

        while i + 1 < tokens.len() && matches!(tokens[i], Token::Period) {
            if let Token::Word(next) = &tokens[i + 1] {
                name.push('.');
                name.push_str(&next.value);
                i += 2;
            } else {
                break;
            }
        }

        (name, i)
    }
}
