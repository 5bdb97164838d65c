use serde_json::Value;

use crate::parser::token_source::{group_tokens, tokenize, SqlToken};
use crate::parser::ParseIssue;
use crate::query::{FilterExpression, FilterOp, LogicOp};

pub struct WhereParser;

impl WhereParser {
    /// Parses the top level of a WHERE clause into its condition list.
    ///
    /// One `OR` anywhere at this level ORs the whole level, and an `AND`
    /// after it does not reset that. A single surviving condition stays
    /// unwrapped; nesting comes from parenthesized groups only.
    pub fn parse(tokens: &[SqlToken]) -> Vec<FilterExpression> {
        let mut conditions = vec![];
        let mut any_or = false;
        let mut i = 0;

        while i < tokens.len() {
            if let SqlToken::Keyword(keyword) = &tokens[i] {
                if let Ok(logic) = LogicOp::try_from(keyword.as_str()) {
                    if logic == LogicOp::Or {
                        any_or = true;
                    }
                    i += 1;
                    continue;
                }
            }

            if Self::at_in_lookahead(tokens, i) {
                if let Some(condition) = Self::parse_comparison(&tokens[i..=i + 2]) {
                    conditions.push(condition);
                }
                i += 3;
                continue;
            }

            match &tokens[i] {
                SqlToken::Comparison(parts) => {
                    if let Some(condition) = Self::parse_comparison(parts) {
                        conditions.push(condition);
                    }
                }
                SqlToken::Group(inner) => {
                    if let Some(condition) = Self::parse_group(inner) {
                        conditions.push(condition);
                    }
                }
                other => Self::collect_fragment(&other.to_string(), &mut conditions),
            }
            i += 1;
        }

        if any_or && conditions.len() > 1 {
            return vec![FilterExpression::group(LogicOp::Or, conditions)];
        }

        conditions
    }

    /// Parses a parenthesized sub-sequence into a single expression.
    ///
    /// `AND`/`OR` keywords steer the group's operator (the last one seen
    /// wins); every other keyword is skipped here. Empty groups dissolve
    /// into `None` and single members come back unwrapped.
    pub fn parse_group(tokens: &[SqlToken]) -> Option<FilterExpression> {
        let mut conditions = vec![];
        let mut current = LogicOp::And;
        let mut i = 0;

        while i < tokens.len() {
            if let SqlToken::Keyword(keyword) = &tokens[i] {
                if let Ok(logic) = LogicOp::try_from(keyword.as_str()) {
                    current = logic;
                }
                i += 1;
                continue;
            }

            if Self::at_in_lookahead(tokens, i) {
                if let Some(condition) = Self::parse_comparison(&tokens[i..=i + 2]) {
                    conditions.push(condition);
                }
                i += 3;
                continue;
            }

            match &tokens[i] {
                SqlToken::Comparison(parts) => {
                    if let Some(condition) = Self::parse_comparison(parts) {
                        conditions.push(condition);
                    }
                }
                SqlToken::Group(inner) => {
                    if let Some(condition) = Self::parse_group(inner) {
                        conditions.push(condition);
                    }
                }
                other => Self::collect_fragment(&other.to_string(), &mut conditions),
            }
            i += 1;
        }

        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(FilterExpression::group(current, conditions)),
        }
    }

    /// Parses one comparison run: field, operator tokens, optional value.
    pub fn parse_comparison(tokens: &[SqlToken]) -> Option<FilterExpression> {
        let field = tokens.first()?.literal_text();

        let mut operator = None;
        let mut value = None;

        for token in &tokens[1..] {
            match token {
                SqlToken::Keyword(keyword) if keyword == "NULL" => {
                    if value.is_none() {
                        value = Some(Value::Null);
                    }
                }
                SqlToken::Keyword(keyword) => operator = Some(FilterOp::from_sql(keyword)),
                SqlToken::Symbol(symbol) => operator = Some(FilterOp::from_sql(symbol)),
                SqlToken::Group(inner) => value = Some(Self::list_value(inner)),
                literal => {
                    if value.is_none() {
                        value = Some(Self::literal_value(literal));
                    }
                }
            }
        }

        Some(FilterExpression::comparison(
            &field,
            operator?,
            value.unwrap_or(Value::Null),
        ))
    }

    /// Fallback for stray tokens: re-tokenizes the fragment text and keeps
    /// any comparisons found, skipping everything else.
    pub fn parse_fragment(text: &str) -> Result<Vec<FilterExpression>, ParseIssue> {
        let raw = tokenize(text)?;
        let tokens = group_tokens(&raw);

        let mut conditions = vec![];
        let mut i = 0;
        while i < tokens.len() {
            if Self::at_in_lookahead(&tokens, i) {
                if let Some(condition) = Self::parse_comparison(&tokens[i..=i + 2]) {
                    conditions.push(condition);
                }
                i += 3;
                continue;
            }

            if let SqlToken::Comparison(parts) = &tokens[i] {
                if let Some(condition) = Self::parse_comparison(parts) {
                    conditions.push(condition);
                }
            }
            i += 1;
        }

        Ok(conditions)
    }

    // field IN (...) arrives as three loose tokens; the value token is
    // consumed along with the keyword, so hits advance the cursor by 3.
    fn at_in_lookahead(tokens: &[SqlToken], i: usize) -> bool {
        i + 2 < tokens.len()
            && matches!(&tokens[i + 1], SqlToken::Keyword(keyword) if keyword == "IN" || keyword == "NOT IN")
    }

    fn collect_fragment(text: &str, conditions: &mut Vec<FilterExpression>) {
        match Self::parse_fragment(text) {
            Ok(found) => conditions.extend(found),
            Err(issue) => tracing::debug!(%issue, "dropping unparseable fragment"),
        }
    }

    fn literal_value(token: &SqlToken) -> Value {
        match token {
            SqlToken::Number(text) => {
                if let Ok(int) = text.parse::<i64>() {
                    return Value::from(int);
                }
                if let Ok(float) = text.parse::<f64>() {
                    return Value::from(float);
                }
                Value::String(text.clone())
            }
            SqlToken::Text(text) => Value::String(text.clone()),
            SqlToken::Word(word) => {
                if word.eq_ignore_ascii_case("true") {
                    return Value::Bool(true);
                }
                if word.eq_ignore_ascii_case("false") {
                    return Value::Bool(false);
                }
                Value::String(word.clone())
            }
            other => Value::String(other.literal_text()),
        }
    }

    // Parenthesis value lists always yield string items, commas dropped.
    fn list_value(tokens: &[SqlToken]) -> Value {
        let mut items = vec![];
        for token in tokens {
            if matches!(token, SqlToken::Symbol(symbol) if symbol == ",") {
                continue;
            }
            items.push(Value::String(token.literal_text()));
        }

        Value::Array(items)
    }
}
