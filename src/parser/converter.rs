use crate::parser::token_source::TokenizedStatement;
use crate::parser::{LimitOffsetParser, OrderByParser, WhereParser};
use crate::query::{Query, QueryBuilder};

pub struct SqlConverter;

impl SqlConverter {
    /// Converts a SQL SELECT statement into a query descriptor.
    ///
    /// Conversion is best-effort and total: fragments that cannot be
    /// understood are dropped and logged, and a statement that does not
    /// tokenize at all yields the empty descriptor. The caller always gets
    /// a [`Query`] back.
    pub fn convert(sql: &str) -> Query {
        let sql = Self::normalize(sql);

        let statement = match TokenizedStatement::parse(&sql) {
            Ok(statement) => statement,
            Err(issue) => {
                tracing::warn!(%issue, "statement did not tokenize, returning empty query");
                return Query::default();
            }
        };

        let mut builder = QueryBuilder::new();

        if let Some(where_clause) = &statement.where_clause {
            builder.and(WhereParser::parse(where_clause));
        }

        let order_fields = OrderByParser::parse(&statement.flat);
        if !order_fields.is_empty() {
            builder.sort(&order_fields);
        }

        let (limit, offset) = LimitOffsetParser::parse(&statement.flat);
        if let Some(limit) = limit {
            builder.limit(limit);
        }
        if let Some(offset) = offset {
            builder.offset(offset);
        }

        builder.build()
    }

    // Parens get breathing room and whitespace runs collapse, so statements
    // glued together like "a=1 AND(b=2)" still tokenize uniformly.
    fn normalize(sql: &str) -> String {
        let spaced = sql.replace('(', " ( ").replace(')', " ) ");
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::parser::SqlConverter;

    fn convert_json(sql: &str) -> serde_json::Value {
        serde_json::to_value(SqlConverter::convert(sql)).expect("Failed to serialize query")
    }

    #[test]
    pub fn test_equality() {
        let value = convert_json("SELECT * FROM users WHERE status = 'active'");

        assert_eq!(value, json!({"filter": {"status": {"_eq": "active"}}}));
    }

    #[test]
    pub fn test_number_value_typed() {
        let value = convert_json("SELECT * FROM users WHERE a = 1");

        assert_eq!(value, json!({"filter": {"a": {"_eq": 1}}}));
    }

    #[test]
    pub fn test_and_conditions() {
        let value = convert_json("SELECT * FROM users WHERE a = 1 AND b = 2");

        assert_eq!(
            value,
            json!({"filter": {"_and": [{"a": {"_eq": 1}}, {"b": {"_eq": 2}}]}})
        );
    }

    #[test]
    pub fn test_or_conditions() {
        let value = convert_json("SELECT * FROM users WHERE a = 1 OR b = 2");

        assert_eq!(
            value,
            json!({"filter": {"_or": [{"a": {"_eq": 1}}, {"b": {"_eq": 2}}]}})
        );
    }

    #[test]
    pub fn test_in_list_at_top_level() {
        let value = convert_json("SELECT * FROM users WHERE x IN (1, 2, 3)");

        assert_eq!(value, json!({"filter": {"x": {"_in": ["1", "2", "3"]}}}));
    }

    #[test]
    pub fn test_parenthesized_or_inside_and() {
        let value = convert_json("SELECT * FROM users WHERE (a = 1 OR b = 2) AND c = 3");

        assert_eq!(
            value,
            json!({
                "filter": {
                    "_and": [
                        {"_or": [{"a": {"_eq": 1}}, {"b": {"_eq": 2}}]},
                        {"c": {"_eq": 3}},
                    ]
                }
            })
        );
    }

    // Mixed operators diverge by level: at the top one OR takes the whole
    // level, inside parens the last operator seen wins.
    #[test]
    pub fn test_mixed_operators_at_top_level() {
        let value = convert_json("SELECT * FROM users WHERE a = 1 OR b = 2 AND c = 3");

        assert_eq!(
            value,
            json!({
                "filter": {
                    "_or": [{"a": {"_eq": 1}}, {"b": {"_eq": 2}}, {"c": {"_eq": 3}}]
                }
            })
        );
    }

    #[test]
    pub fn test_mixed_operators_inside_parens() {
        let value = convert_json("SELECT * FROM users WHERE (a = 1 OR b = 2 AND c = 3)");

        assert_eq!(
            value,
            json!({
                "filter": {
                    "_and": [{"a": {"_eq": 1}}, {"b": {"_eq": 2}}, {"c": {"_eq": 3}}]
                }
            })
        );
    }

    #[test]
    pub fn test_is_null() {
        let value = convert_json("SELECT * FROM users WHERE email IS NULL");

        assert_eq!(value, json!({"filter": {"email": {"_null": null}}}));
    }

    #[test]
    pub fn test_like_becomes_contains() {
        let value = convert_json("SELECT * FROM users WHERE name LIKE '%smith%'");

        assert_eq!(value, json!({"filter": {"name": {"_contains": "%smith%"}}}));
    }

    #[test]
    pub fn test_order_by_and_paging() {
        let value =
            convert_json("SELECT * FROM users ORDER BY name, created_at DESC LIMIT 10 OFFSET 5");

        assert_eq!(
            value,
            json!({"sort": ["name", "-created_at"], "limit": 10, "offset": 5})
        );
    }

    #[test]
    pub fn test_full_statement() {
        let value = convert_json(
            "select * from users where age>=18 order by age desc limit 10 offset 2",
        );

        assert_eq!(
            value,
            json!({
                "filter": {"age": {"_gte": 18}},
                "sort": ["-age"],
                "limit": 10,
                "offset": 2,
            })
        );
    }

    #[test]
    pub fn test_statement_without_clauses() {
        let value = convert_json("SELECT * FROM users");

        assert_eq!(value, json!({}));
    }

    #[test]
    pub fn test_non_numeric_limit_ignored() {
        let value = convert_json("SELECT * FROM users LIMIT abc");

        assert_eq!(value, json!({}));
    }

    #[test]
    pub fn test_desc_without_field_ignored() {
        let value = convert_json("SELECT * FROM users ORDER BY DESC");

        assert_eq!(value, json!({}));
    }

    #[test]
    pub fn test_empty_parens_dropped() {
        let value = convert_json("SELECT * FROM users WHERE (a = 1) AND ()");

        assert_eq!(value, json!({"filter": {"a": {"_eq": 1}}}));
    }

    #[test]
    pub fn test_unsupported_fragment_dropped() {
        let value = convert_json("SELECT * FROM users WHERE LOWER(x) = 3 AND a = 2");

        assert_eq!(value, json!({"filter": {"a": {"_eq": 2}}}));
    }

    #[test]
    pub fn test_where_without_usable_conditions() {
        let value = convert_json("SELECT * FROM users WHERE garbage");

        assert_eq!(value, json!({}));
    }

    #[test]
    pub fn test_unterminated_string_yields_empty_query() {
        let value = convert_json("SELECT * FROM users WHERE name = 'unterminated");

        assert_eq!(value, json!({}));
    }

    #[test]
    pub fn test_glued_statement_normalized() {
        let value = convert_json("SELECT * FROM users WHERE a=1 AND(b=2 OR c=3)");

        assert_eq!(
            value,
            json!({
                "filter": {
                    "_and": [
                        {"a": {"_eq": 1}},
                        {"_or": [{"b": {"_eq": 2}}, {"c": {"_eq": 3}}]},
                    ]
                }
            })
        );
    }
}
