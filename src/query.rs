use sqlx::{Encode, QueryBuilder, Sqlite, Type};

use crate::dates::DateRange;

/// Appends optional `WHERE`/`AND` conditions to a base query.
///
/// Every value goes through a bind parameter; column names are always
/// literals supplied by the repositories.
pub struct Filter<'a> {
    qb: QueryBuilder<'a, Sqlite>,
    has_where: bool,
}

impl<'a> Filter<'a> {
    pub fn new(head: &str) -> Self {
        Self {
            qb: QueryBuilder::new(head),
            has_where: false,
        }
    }

    /// `head WHERE owner = ?`
    pub fn owned(head: &str, owner_column: &str, user_id: i64) -> Self {
        let mut filter = Self::new(head);
        filter.eq(owner_column, Some(user_id));
        filter
    }

    fn connective(&mut self) -> &mut QueryBuilder<'a, Sqlite> {
        self.qb.push(if self.has_where { " AND " } else { " WHERE " });
        self.has_where = true;
        &mut self.qb
    }

    pub fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Sqlite> + Type<Sqlite> + Send,
    {
        if let Some(value) = value {
            self.connective().push(column).push(" = ").push_bind(value);
        }
        self
    }

    /// Owned rows plus shared rows where the owner column is NULL.
    pub fn owned_or_shared(&mut self, owner_column: &str, user_id: i64) -> &mut Self {
        self.connective()
            .push("(")
            .push(owner_column)
            .push(" = ")
            .push_bind(user_id)
            .push(" OR ")
            .push(owner_column)
            .push(" IS NULL)");
        self
    }

    pub fn date_range(&mut self, column: &str, range: &DateRange) -> &mut Self {
        if let Some(start) = range.start {
            self.connective().push(column).push(" >= ").push_bind(start);
        }
        if let Some(end) = range.end {
            self.connective().push(column).push(" <= ").push_bind(end);
        }
        self
    }

    /// Case-insensitive (for ASCII) substring match. `%` and `_` in the
    /// needle match literally.
    pub fn contains(&mut self, column: &str, needle: Option<&str>) -> &mut Self {
        if let Some(needle) = needle {
            self.connective()
                .push(column)
                .push(" LIKE ")
                .push_bind(format!("%{}%", escape_like(needle)))
                .push(r" ESCAPE '\'");
        }
        self
    }

    /// Adds a literal condition. Never pass user input here.
    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.connective().push(condition);
        self
    }

    pub fn sql(&self) -> &str {
        self.qb.sql()
    }

    pub fn into_builder(self) -> QueryBuilder<'a, Sqlite> {
        self.qb
    }
}

fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
