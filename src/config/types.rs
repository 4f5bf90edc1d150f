//! Entity schema descriptors: what the engine needs to know about a table to
//! serve it without entity-specific code.

use std::collections::BTreeMap;

/// Primary key column shared by every entity.
pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Storage class of a column. Drives DDL, binding and decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    /// JSON document stored as text.
    Json,
    /// RFC 3339 text assigned by storage.
    Timestamp,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text | ColumnKind::Json | ColumnKind::Timestamp => "TEXT",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    /// Id and timestamps: never client-supplied.
    pub managed: bool,
}

impl ColumnDef {
    pub fn attribute(name: &'static str, kind: ColumnKind, nullable: bool) -> Self {
        ColumnDef {
            name,
            kind,
            nullable,
            managed: false,
        }
    }

    fn managed(name: &'static str, kind: ColumnKind, nullable: bool) -> Self {
        ColumnDef {
            name,
            kind,
            nullable,
            managed: true,
        }
    }
}

/// `column` holds the id of a row of `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub target: &'static str,
}

/// Denormalized column that must equal a column of the row reached through `via`.
/// e.g. card_representation.game_id == proto_card(proto_card_id).game_id
#[derive(Clone, Debug, PartialEq)]
pub struct Agreement {
    pub column: &'static str,
    pub via: &'static str,
    pub target_column: &'static str,
}

/// Per-column request rules, checked before any storage access.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationRule {
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<&'static str>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl ValidationRule {
    /// Non-empty string of bounded length.
    pub fn name() -> Self {
        ValidationRule {
            min_length: Some(1),
            max_length: Some(255),
            ..Default::default()
        }
    }

    /// Language tag such as `en`, `ja` or `pt-BR`.
    pub fn locale() -> Self {
        ValidationRule {
            pattern: Some(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$"),
            max_length: Some(35),
            ..Default::default()
        }
    }

    pub fn non_negative() -> Self {
        ValidationRule {
            minimum: Some(0.0),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntitySchema {
    /// Routable path segment, e.g. `set_representation`.
    pub resource: &'static str,
    pub table: &'static str,
    /// Id first, then attributes in declaration order, then timestamps.
    pub columns: Vec<ColumnDef>,
    pub references: Vec<ForeignKey>,
    pub unique: Vec<&'static str>,
    pub agreements: Vec<Agreement>,
    /// Resources this entity must never reference, directly or by column name.
    pub forbidden: Vec<&'static str>,
    pub validation: BTreeMap<&'static str, ValidationRule>,
}

impl EntitySchema {
    pub fn new(resource: &'static str, table: &'static str, attributes: Vec<ColumnDef>) -> Self {
        let mut columns = Vec::with_capacity(attributes.len() + 3);
        columns.push(ColumnDef::managed(ID_COLUMN, ColumnKind::Integer, false));
        columns.extend(attributes);
        columns.push(ColumnDef::managed(CREATED_AT_COLUMN, ColumnKind::Timestamp, false));
        columns.push(ColumnDef::managed(UPDATED_AT_COLUMN, ColumnKind::Timestamp, true));
        EntitySchema {
            resource,
            table,
            columns,
            references: Vec::new(),
            unique: Vec::new(),
            agreements: Vec::new(),
            forbidden: Vec::new(),
            validation: BTreeMap::new(),
        }
    }

    pub fn references(mut self, column: &'static str, target: &'static str) -> Self {
        self.references.push(ForeignKey { column, target });
        self
    }

    pub fn unique(mut self, column: &'static str) -> Self {
        self.unique.push(column);
        self
    }

    pub fn agrees(mut self, column: &'static str, via: &'static str, target_column: &'static str) -> Self {
        self.agreements.push(Agreement {
            column,
            via,
            target_column,
        });
        self
    }

    pub fn forbids(mut self, target: &'static str) -> Self {
        self.forbidden.push(target);
        self
    }

    pub fn rule(mut self, column: &'static str, rule: ValidationRule) -> Self {
        self.validation.insert(column, rule);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.managed)
    }

    pub fn reference(&self, column: &str) -> Option<&ForeignKey> {
        self.references.iter().find(|r| r.column == column)
    }
}
