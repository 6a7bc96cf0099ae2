use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

/// A single bound value of a [`FieldMask`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Bool(bool),
    Integer(i64),
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        FieldValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl FieldValue {
    fn push_bind(self, qb: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            FieldValue::Text(v) => qb.push_bind(v),
            FieldValue::Uuid(v) => qb.push_bind(v),
            FieldValue::Timestamp(v) => qb.push_bind(v),
            FieldValue::Bool(v) => qb.push_bind(v),
            FieldValue::Integer(v) => qb.push_bind(v),
        };
    }
}

/// Ordered column → value list for partial inserts and updates.
///
/// Column names are `&'static str` so only identifiers written in the source
/// can reach the SQL text; every value goes through a `?` placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMask {
    fields: Vec<(&'static str, FieldValue)>,
}

impl FieldMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<FieldValue>) -> &mut Self {
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value.into(),
            None => self.fields.push((column, value.into())),
        }
        self
    }

    pub fn set_opt<V: Into<FieldValue>>(&mut self, column: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(c, _)| *c)
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    /// `INSERT INTO <table> (<columns>) VALUES (?, ...)`.
    pub fn into_insert(self, table: &'static str) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", table));
        {
            let mut cols = qb.separated(", ");
            for (column, _) in &self.fields {
                cols.push(*column);
            }
        }
        qb.push(") VALUES (");
        for (i, (_, value)) in self.fields.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            value.push_bind(&mut qb);
        }
        qb.push(")");
        qb
    }

    /// `UPDATE <table> SET c = ?, ... WHERE f1 = ? AND f2 = ?`.
    ///
    /// Callers must check `is_empty()` first; an empty mask yields invalid SQL.
    pub fn into_update(self, table: &'static str, filters: &[(&'static str, Uuid)]) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", table));
        for (i, (column, value)) in self.fields.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column).push(" = ");
            value.push_bind(&mut qb);
        }
        qb.push(" WHERE ");
        for (i, (column, key)) in filters.iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            qb.push(*column).push(" = ").push_bind(*key);
        }
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_opt_skips_none() {
        let mut mask = FieldMask::new();
        mask.set_opt("title", Some("Work".to_string())).set_opt::<String>("description", None);
        assert_eq!(mask.len(), 1);
        assert_eq!(mask.columns().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn set_replaces_existing_column() {
        let mut mask = FieldMask::new();
        mask.set("title", "a").set("title", "b");
        assert_eq!(mask.len(), 1);
        assert_eq!(mask.get("title"), Some(&FieldValue::Text("b".into())));
    }

    #[test]
    fn update_binds_every_value() {
        let mut mask = FieldMask::new();
        mask.set("title", "x'; DROP TABLE tag; --").set("is_active", true);
        let qb = mask.into_update("reminder", &[("id", Uuid::nil()), ("user_id", Uuid::nil())]);
        assert_eq!(qb.sql(), "UPDATE reminder SET title = ?, is_active = ? WHERE id = ? AND user_id = ?");
    }

    #[test]
    fn insert_lists_only_supplied_columns() {
        let mut mask = FieldMask::new();
        mask.set("id", Uuid::nil()).set("first_name", "Ann").set_opt::<String>("last_name", None);
        let qb = mask.into_insert("friend");
        assert_eq!(qb.sql(), "INSERT INTO friend (id, first_name) VALUES (?, ?)");
    }

    #[test]
    fn empty_mask() {
        assert!(FieldMask::new().is_empty());
    }
}
