//! SELECT query builder.

use crate::parser::{AuthorizedFilter, FilterSink};
use crate::validate::assert_valid_sql_identifier;

use super::types::{QueryResult, SortDir, SortField};

/// SELECT builder that splices authorized filters into its `WHERE` clause.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    fields: Vec<String>,
    filters: Vec<String>,
    sorts: Vec<SortField>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Start a SELECT on `table`.
///
/// # Panics
///
/// Panics if the table name is not a valid, possibly schema-qualified, SQL
/// identifier.
pub fn select(table: impl Into<String>) -> QueryBuilder {
    QueryBuilder::new(table)
}

impl QueryBuilder {
    /// Create a new query builder for the given table.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            table,
            fields: Vec::new(),
            filters: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Set the fields to SELECT.
    ///
    /// # Panics
    ///
    /// Panics if any field name is not a valid SQL identifier.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for field in fields {
            assert_valid_sql_identifier(field, "field");
        }
        self.fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Add a sort field.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn sort(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        let field = field.into();
        assert_valid_sql_identifier(&field, "sort field");
        self.sorts.push(SortField::new(field, dir));
        self
    }

    /// Set a limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set an offset.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set pagination with page number (1-indexed) and limit.
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(page.saturating_sub(1).saturating_mul(limit));
        self
    }

    /// Build the SQL query.
    pub fn build(self) -> QueryResult {
        let select_str = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };

        let mut sql = format!("SELECT {select_str} FROM {}", self.table);

        match self.filters.as_slice() {
            [] => {},
            [only] => {
                sql.push_str(" WHERE ");
                sql.push_str(only);
            },
            many => {
                let wrapped: Vec<String> = many.iter().map(|f| format!("({f})")).collect();
                sql.push_str(" WHERE ");
                sql.push_str(&wrapped.join(" AND "));
            },
        }

        if !self.sorts.is_empty() {
            let sort_parts: Vec<String> = self.sorts.iter().map(ToString::to_string).collect();
            sql.push_str(&format!(" ORDER BY {}", sort_parts.join(", ")));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        QueryResult { sql }
    }
}

impl FilterSink for QueryBuilder {
    fn attach_filter(mut self, filter: &AuthorizedFilter<'_>) -> Self {
        self.filters.push(filter.as_str().to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WhereParser;
    use crate::registry::ValidatorRegistry;

    fn attach(builder: QueryBuilder, fragment: &str) -> QueryBuilder {
        WhereParser::new(ValidatorRegistry::new())
            .parse_and_attach(fragment, builder)
            .unwrap()
    }

    #[test]
    fn test_plain_select() {
        assert_eq!(select("orders").build().sql, "SELECT * FROM orders");
        assert_eq!(
            select("shop.orders").fields(&["id", "total"]).build().sql,
            "SELECT id, total FROM shop.orders"
        );
    }

    #[test]
    fn test_single_filter_emitted_raw() {
        let sql = attach(select("orders"), "WHERE a = 1 OR b = 2").build().sql;
        assert_eq!(sql, "SELECT * FROM orders WHERE a = 1 OR b = 2");
    }

    #[test]
    fn test_multiple_filters_parenthesized() {
        let builder = attach(select("orders"), "a = 1 OR b = 2");
        let sql = attach(builder, "c = 3").build().sql;
        assert_eq!(sql, "SELECT * FROM orders WHERE (a = 1 OR b = 2) AND (c = 3)");
    }

    #[test]
    fn test_clause_order() {
        let sql = attach(select("orders").fields(&["id"]), "status = 'open'")
            .sort("created_at", SortDir::Desc)
            .sort("id", SortDir::Asc)
            .limit(10)
            .offset(20)
            .build()
            .sql;
        assert_eq!(
            sql,
            "SELECT id FROM orders WHERE status = 'open' ORDER BY created_at DESC, id ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_page() {
        let sql = select("orders").page(3, 25).build().sql;
        assert_eq!(sql, "SELECT * FROM orders LIMIT 25 OFFSET 50");

        let sql = select("orders").page(0, 25).build().sql;
        assert_eq!(sql, "SELECT * FROM orders LIMIT 25 OFFSET 0");
    }

    #[test]
    #[should_panic(expected = "Invalid SQL table name")]
    fn test_invalid_table_panics() {
        let _ = select("orders; DROP TABLE users");
    }

    #[test]
    #[should_panic(expected = "Invalid SQL sort field name")]
    fn test_invalid_sort_panics() {
        let _ = select("orders").sort("id DESC, (SELECT 1)", SortDir::Asc);
    }
}
