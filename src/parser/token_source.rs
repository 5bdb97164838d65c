use std::fmt;

use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer, Word};

use crate::parser::ParseIssue;

/// Runs the external SQL tokenizer over `sql`.
pub fn tokenize(sql: &str) -> Result<Vec<Token>, ParseIssue> {
    let dialect = GenericDialect {};
    Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|err| ParseIssue::new(&err.to_string(), sql))
}

/// Grouped view of a raw token stream, the unit the WHERE parser works on.
///
/// The raw stream is flattened into this shape: whitespace dropped,
/// balanced parens folded into `Group`, binary comparisons folded into
/// `Comparison`, compound operator keywords (`NOT IN`, `IS NULL`,
/// `IS NOT NULL`, `NOT LIKE`) merged into single tokens and dotted
/// identifiers stitched back together. `IN` is deliberately left out of
/// comparison folding; the WHERE parser resolves it with a look-ahead.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlToken {
    /// Structural keyword, uppercased.
    Keyword(String),
    /// Identifier or other bare word, as written.
    Word(String),
    Number(String),
    /// String literal, quotes stripped.
    Text(String),
    /// Operator or punctuation. `<>` is normalized to `!=`.
    Symbol(String),
    /// Contents of a balanced `( ... )`, parens stripped.
    Group(Vec<SqlToken>),
    /// A folded comparison: left operand, operator, optional right side.
    Comparison(Vec<SqlToken>),
}

impl SqlToken {
    /// The bare text of a leaf token; string literals come back unquoted.
    pub fn literal_text(&self) -> String {
        match self {
            SqlToken::Text(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SqlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlToken::Keyword(text)
            | SqlToken::Word(text)
            | SqlToken::Number(text)
            | SqlToken::Symbol(text) => write!(f, "{}", text),
            SqlToken::Text(text) => write!(f, "'{}'", text),
            SqlToken::Group(tokens) => write!(f, "( {} )", join_tokens(tokens)),
            SqlToken::Comparison(tokens) => write!(f, "{}", join_tokens(tokens)),
        }
    }
}

fn join_tokens(tokens: &[SqlToken]) -> String {
    tokens
        .iter()
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the grouped view of a raw token slice.
pub fn group_tokens(tokens: &[Token]) -> Vec<SqlToken> {
    group_comparisons(stitch_dotted(classify(tokens)))
}

// Keywords that keep their structural meaning in the grouped view. Any
// other reserved word is treated as a plain identifier, so columns named
// after keywords still compare.
fn is_structural(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::AND
            | Keyword::OR
            | Keyword::IN
            | Keyword::NOT
            | Keyword::IS
            | Keyword::NULL
            | Keyword::LIKE
            | Keyword::BETWEEN
    )
}

fn classify(tokens: &[Token]) -> Vec<SqlToken> {
    let mut out = vec![];
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Whitespace(_) | Token::EOF => i += 1,
            Token::LParen => {
                let close = matching_paren(tokens, i);
                out.push(SqlToken::Group(group_tokens(&tokens[i + 1..close])));
                i = close + 1;
            }
            // unbalanced close, nothing to pair it with
            Token::RParen => i += 1,
            Token::Word(word) => {
                let (token, next) = classify_word(tokens, i, word);
                out.push(token);
                i = next;
            }
            Token::Number(text, _) => {
                out.push(SqlToken::Number(text.clone()));
                i += 1;
            }
            Token::SingleQuotedString(text) | Token::DoubleQuotedString(text) => {
                out.push(SqlToken::Text(text.clone()));
                i += 1;
            }
            token => {
                let spelling = match symbol_spelling(token) {
                    Some(spelling) => spelling.to_string(),
                    None => token.to_string(),
                };
                out.push(SqlToken::Symbol(spelling));
                i += 1;
            }
        }
    }

    out
}

fn matching_paren(tokens: &[Token], open: usize) -> usize {
    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    // unbalanced open swallows the rest
    tokens.len()
}

fn classify_word(tokens: &[Token], i: usize, word: &Word) -> (SqlToken, usize) {
    if word.quote_style.is_some() || !is_structural(word.keyword) {
        return (SqlToken::Word(word.value.clone()), i + 1);
    }

    match word.keyword {
        Keyword::NOT => {
            if let Some((Keyword::IN, at)) = next_keyword(tokens, i + 1) {
                return (SqlToken::Keyword("NOT IN".to_string()), at + 1);
            }
            if let Some((Keyword::LIKE, at)) = next_keyword(tokens, i + 1) {
                return (SqlToken::Keyword("NOT LIKE".to_string()), at + 1);
            }
        }
        Keyword::IS => {
            if let Some((Keyword::NULL, at)) = next_keyword(tokens, i + 1) {
                return (SqlToken::Keyword("IS NULL".to_string()), at + 1);
            }
            if let Some((Keyword::NOT, not_at)) = next_keyword(tokens, i + 1) {
                if let Some((Keyword::NULL, at)) = next_keyword(tokens, not_at + 1) {
                    return (SqlToken::Keyword("IS NOT NULL".to_string()), at + 1);
                }
            }
        }
        _ => {}
    }

    (SqlToken::Keyword(word.value.to_uppercase()), i + 1)
}

// Next unquoted word after `from`, skipping whitespace only.
fn next_keyword(tokens: &[Token], from: usize) -> Option<(Keyword, usize)> {
    let mut i = from;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Whitespace(_) => i += 1,
            Token::Word(word) if word.quote_style.is_none() => return Some((word.keyword, i)),
            _ => return None,
        }
    }
    None
}

/// The keyword of an unquoted word token, if it is one.
pub(crate) fn unquoted_keyword(token: &Token) -> Option<Keyword> {
    match token {
        Token::Word(word) if word.quote_style.is_none() => Some(word.keyword),
        _ => None,
    }
}

/// Index of the next non-whitespace token at or after `from`.
pub(crate) fn next_non_whitespace(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !matches!(tokens[i], Token::Whitespace(_)))
}

fn symbol_spelling(token: &Token) -> Option<&'static str> {
    match token {
        Token::Eq => Some("="),
        Token::DoubleEq => Some("=="),
        Token::Neq => Some("!="),
        Token::Lt => Some("<"),
        Token::Gt => Some(">"),
        Token::LtEq => Some("<="),
        Token::GtEq => Some(">="),
        _ => None,
    }
}

// Rejoins `a . b . c` runs the tokenizer split apart.
fn stitch_dotted(tokens: Vec<SqlToken>) -> Vec<SqlToken> {
    let mut out: Vec<SqlToken> = Vec::with_capacity(tokens.len());

    for token in tokens {
        if let SqlToken::Word(next) = &token {
            if let Some(SqlToken::Word(prev)) = out.last_mut() {
                if prev.ends_with('.') {
                    prev.push_str(next);
                    continue;
                }
            }
        }
        if matches!(&token, SqlToken::Symbol(symbol) if symbol == ".") {
            if let Some(SqlToken::Word(prev)) = out.last_mut() {
                prev.push('.');
                continue;
            }
        }
        out.push(token);
    }

    out
}

fn group_comparisons(tokens: Vec<SqlToken>) -> Vec<SqlToken> {
    let mut out: Vec<SqlToken> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        // operand IS [NOT] NULL folds into a two-token comparison
        if i + 1 < tokens.len() && is_operand(&tokens[i]) && is_null_test(&tokens[i + 1]) {
            out.push(SqlToken::Comparison(vec![
                tokens[i].clone(),
                tokens[i + 1].clone(),
            ]));
            i += 2;
            continue;
        }

        // operand <op> operand folds into a three-token comparison
        if i + 2 < tokens.len()
            && is_operand(&tokens[i])
            && comparison_spelling(&tokens[i + 1]).is_some()
            && is_right_operand(&tokens[i + 2])
        {
            out.push(SqlToken::Comparison(vec![
                tokens[i].clone(),
                tokens[i + 1].clone(),
                tokens[i + 2].clone(),
            ]));
            i += 3;
            continue;
        }

        out.push(tokens[i].clone());
        i += 1;
    }

    out
}

fn comparison_spelling(token: &SqlToken) -> Option<&str> {
    match token {
        SqlToken::Symbol(symbol)
            if matches!(symbol.as_str(), "=" | "==" | "!=" | "<" | "<=" | ">" | ">=") =>
        {
            Some(symbol.as_str())
        }
        SqlToken::Keyword(keyword) if matches!(keyword.as_str(), "LIKE" | "NOT LIKE") => {
            Some(keyword.as_str())
        }
        _ => None,
    }
}

fn is_operand(token: &SqlToken) -> bool {
    matches!(
        token,
        SqlToken::Word(_) | SqlToken::Number(_) | SqlToken::Text(_)
    )
}

fn is_right_operand(token: &SqlToken) -> bool {
    match token {
        SqlToken::Group(_) => true,
        SqlToken::Keyword(keyword) => keyword == "NULL",
        other => is_operand(other),
    }
}

fn is_null_test(token: &SqlToken) -> bool {
    matches!(token, SqlToken::Keyword(keyword) if keyword == "IS NULL" || keyword == "IS NOT NULL")
}

/// One tokenized statement: the raw stream for the linear clause scans and
/// the grouped WHERE body, when the statement has one.
#[derive(Debug, Clone)]
pub struct TokenizedStatement {
    pub flat: Vec<Token>,
    pub where_clause: Option<Vec<SqlToken>>,
}

impl TokenizedStatement {
    pub fn parse(sql: &str) -> Result<Self, ParseIssue> {
        let flat = tokenize(sql)?;
        let where_clause =
            Self::where_range(&flat).map(|(start, end)| group_tokens(&flat[start..end]));

        Ok(Self { flat, where_clause })
    }

    // Body of the top-level WHERE clause: after the keyword, up to the next
    // clause keyword at paren depth zero.
    fn where_range(tokens: &[Token]) -> Option<(usize, usize)> {
        let mut depth = 0usize;
        let mut start = None;

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                Token::SemiColon if depth == 0 => {
                    if let Some(from) = start {
                        return Some((from, i));
                    }
                }
                Token::Word(word) if depth == 0 && word.quote_style.is_none() => match start {
                    None => {
                        if word.keyword == Keyword::WHERE {
                            start = Some(i + 1);
                        }
                    }
                    Some(from) => {
                        if Self::ends_where(word.keyword) {
                            return Some((from, i));
                        }
                    }
                },
                _ => {}
            }
        }

        start.map(|from| (from, tokens.len()))
    }

    fn ends_where(keyword: Keyword) -> bool {
        matches!(
            keyword,
            Keyword::ORDER
                | Keyword::GROUP
                | Keyword::HAVING
                | Keyword::LIMIT
                | Keyword::OFFSET
                | Keyword::UNION
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::token_source::{group_tokens, tokenize, SqlToken, TokenizedStatement};

    fn grouped(sql: &str) -> Vec<SqlToken> {
        let tokens = tokenize(sql).expect("Failed to tokenize");
        group_tokens(&tokens)
    }

    #[test]
    pub fn test_tokenize_error() {
        let result = tokenize("SELECT * FROM users WHERE name = 'unterminated");

        match result {
            Ok(_) => panic!(),
            Err(issue) => assert!(issue.message.contains("Unterminated")),
        }
    }

    #[test]
    pub fn test_comparison_folds() {
        let tokens = grouped("a = 1");

        assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            SqlToken::Comparison(parts) => {
                assert_eq!(parts[0], SqlToken::Word("a".to_string()));
                assert_eq!(parts[1], SqlToken::Symbol("=".to_string()));
                assert_eq!(parts[2], SqlToken::Number("1".to_string()));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_neq_spelling_normalized() {
        let tokens = grouped("a <> 1");

        match &tokens[0] {
            SqlToken::Comparison(parts) => {
                assert_eq!(parts[1], SqlToken::Symbol("!=".to_string()));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_string_literal_unquoted() {
        let tokens = grouped("status = 'active'");

        match &tokens[0] {
            SqlToken::Comparison(parts) => {
                assert_eq!(parts[2], SqlToken::Text("active".to_string()));
                assert_eq!(parts[2].literal_text(), "active");
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_parens_fold_into_group() {
        let tokens = grouped("( a = 1 OR b = 2 )");

        assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            SqlToken::Group(inner) => {
                assert_eq!(inner.len(), 3);
                assert!(matches!(inner[0], SqlToken::Comparison(_)));
                assert_eq!(inner[1], SqlToken::Keyword("OR".to_string()));
                assert!(matches!(inner[2], SqlToken::Comparison(_)));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_in_stays_unfolded() {
        let tokens = grouped("x IN ( 1 , 2 , 3 )");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], SqlToken::Word("x".to_string()));
        assert_eq!(tokens[1], SqlToken::Keyword("IN".to_string()));
        match &tokens[2] {
            SqlToken::Group(inner) => {
                assert_eq!(inner.len(), 5);
                assert_eq!(inner[0], SqlToken::Number("1".to_string()));
                assert_eq!(inner[1], SqlToken::Symbol(",".to_string()));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_not_in_merges() {
        let tokens = grouped("x NOT IN ( 1 , 2 )");

        assert_eq!(tokens[1], SqlToken::Keyword("NOT IN".to_string()));
    }

    #[test]
    pub fn test_is_null_folds() {
        let tokens = grouped("email IS NULL");

        assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            SqlToken::Comparison(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1], SqlToken::Keyword("IS NULL".to_string()));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_is_not_null_folds() {
        let tokens = grouped("email IS NOT NULL");

        match &tokens[0] {
            SqlToken::Comparison(parts) => {
                assert_eq!(parts[1], SqlToken::Keyword("IS NOT NULL".to_string()));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_like_folds() {
        let tokens = grouped("name LIKE '%smith%'");

        match &tokens[0] {
            SqlToken::Comparison(parts) => {
                assert_eq!(parts[1], SqlToken::Keyword("LIKE".to_string()));
                assert_eq!(parts[2], SqlToken::Text("%smith%".to_string()));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_dotted_name_stitched() {
        let tokens = grouped("user.role = 'admin'");

        match &tokens[0] {
            SqlToken::Comparison(parts) => {
                assert_eq!(parts[0], SqlToken::Word("user.role".to_string()));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_keyword_named_column_still_compares() {
        let tokens = grouped("key = 1");

        assert!(matches!(tokens[0], SqlToken::Comparison(_)));
    }

    #[test]
    pub fn test_group_display_retokenizes() {
        let tokens = grouped("( 1 , 2 )");

        assert_eq!(tokens[0].to_string(), "( 1 , 2 )");
    }

    #[test]
    pub fn test_statement_without_where() {
        let statement =
            TokenizedStatement::parse("SELECT * FROM users").expect("Failed to tokenize");

        assert!(statement.where_clause.is_none());
        assert!(!statement.flat.is_empty());
    }

    #[test]
    pub fn test_statement_with_where() {
        let statement = TokenizedStatement::parse("SELECT * FROM users WHERE age >= 18")
            .expect("Failed to tokenize");

        let clause = statement.where_clause.expect("Missing where clause");
        assert_eq!(clause.len(), 1);
        assert!(matches!(clause[0], SqlToken::Comparison(_)));
    }

    #[test]
    pub fn test_where_stops_at_order_by() {
        let statement =
            TokenizedStatement::parse("SELECT * FROM users WHERE age >= 18 ORDER BY name LIMIT 5")
                .expect("Failed to tokenize");

        let clause = statement.where_clause.expect("Missing where clause");
        assert_eq!(clause.len(), 1);
    }

    #[test]
    pub fn test_where_stops_at_semicolon() {
        let statement = TokenizedStatement::parse("SELECT * FROM users WHERE age >= 18;")
            .expect("Failed to tokenize");

        let clause = statement.where_clause.expect("Missing where clause");
        assert_eq!(clause.len(), 1);
    }
}
