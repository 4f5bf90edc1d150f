//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from an entity schema.

use crate::config::{EntitySchema, ID_COLUMN, UPDATED_AT_COLUMN};
use crate::model::DbId;
use crate::sql::SqlValue;

/// Current time as RFC 3339 text with millisecond precision, evaluated by SQLite.
pub const NOW_EXPR: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Quote identifier for SQLite (safe: only from the registry).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: SqlValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

fn select_column_list(entity: &EntitySchema) -> String {
    entity
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key. Caller adds id as sole param.
pub fn select_by_id(entity: &EntitySchema) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(entity),
        quoted(entity.table),
        quoted(ID_COLUMN)
    );
    q
}

/// SELECT every row, ORDER BY id.
pub fn select_list(entity: &EntitySchema) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(entity),
        quoted(entity.table),
        quoted(ID_COLUMN)
    );
    q
}

/// INSERT the given attribute values; id and created_at come from storage.
pub fn insert(entity: &EntitySchema, values: Vec<(&str, SqlValue)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (name, val) in values {
        let n = q.push_param(val);
        cols.push(quoted(name));
        placeholders.push(format!("${}", n));
    }
    let returning = select_column_list(entity);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(entity.table), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(entity.table),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only the given columns, and always reassign updated_at.
pub fn update(entity: &EntitySchema, id: DbId, sets: Vec<(&str, SqlValue)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut set_parts = Vec::with_capacity(sets.len() + 1);
    for (name, val) in sets {
        let n = q.push_param(val);
        set_parts.push(format!("{} = ${}", quoted(name), n));
    }
    set_parts.push(format!("{} = {}", quoted(UPDATED_AT_COLUMN), NOW_EXPR));
    let id_param = q.push_param(SqlValue::Integer(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(entity.table),
        set_parts.join(", "),
        quoted(ID_COLUMN),
        id_param,
        select_column_list(entity)
    );
    q
}

/// DELETE by id. Caller adds id as sole param.
pub fn delete(entity: &EntitySchema) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        quoted(entity.table),
        quoted(ID_COLUMN),
        select_column_list(entity)
    );
    q
}

/// `SELECT 1 FROM table WHERE column = $1 LIMIT 1`.
pub fn exists_where(table: &str, column: &str) -> String {
    format!("SELECT 1 FROM {} WHERE {} = $1 LIMIT 1", quoted(table), quoted(column))
}

/// Another row (id <> $2) already holding value $1 in `column`.
pub fn conflicting(entity: &EntitySchema, column: &str) -> String {
    format!(
        "SELECT {id} FROM {} WHERE {} = $1 AND {id} <> $2 LIMIT 1",
        quoted(entity.table),
        quoted(column),
        id = quoted(ID_COLUMN)
    )
}

/// `SELECT column FROM table WHERE id = $1`.
pub fn select_column_by_id(table: &str, column: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        quoted(column),
        quoted(table),
        quoted(ID_COLUMN)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Catalog, Resource, SetRepresentation};

    #[test]
    fn insert_lists_only_supplied_attributes() {
        let schema = Catalog::schema();
        let q = insert(&schema, vec![("name", SqlValue::Text("VendorA".into()))]);
        assert_eq!(
            q.sql,
            "INSERT INTO \"catalogs\" (\"name\") VALUES ($1) RETURNING \"id\", \"name\", \"created_at\", \"updated_at\""
        );
        assert_eq!(q.params, vec![SqlValue::Text("VendorA".into())]);
    }

    #[test]
    fn update_always_touches_updated_at() {
        let schema = SetRepresentation::schema();
        let q = update(&schema, 4, vec![("size", SqlValue::Integer(0))]);
        assert!(q.sql.starts_with(&format!(
            "UPDATE \"set_representations\" SET \"size\" = $1, \"updated_at\" = {} WHERE \"id\" = $2",
            NOW_EXPR
        )));
        assert_eq!(q.params, vec![SqlValue::Integer(0), SqlValue::Integer(4)]);

        let empty = update(&schema, 4, Vec::new());
        assert!(empty.sql.contains(&format!("SET \"updated_at\" = {} WHERE \"id\" = $1", NOW_EXPR)));
    }

    #[test]
    fn list_is_ordered_by_id() {
        let q = select_list(&Catalog::schema());
        assert!(q.sql.ends_with("FROM \"catalogs\" ORDER BY \"id\""));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quoted("odd\"name"), "\"odd\"\"name\"");
    }
}
