//! Entity graph: canonical field lists and the projections derived from them.
//!
//! Every entity is declared once with [`entity!`]. The macro emits the public
//! row type, a `Create` projection (attributes only), an `Update` projection
//! (every attribute wrapped in [`Patch`]) and the [`Resource`] impl carrying
//! the entity's relational schema. Set membership of a card is
//! not an attribute of [`ProtoCard`]; it is only reachable through
//! `CardRepresentation -> SetRepresentation -> ProtoSet`.

use crate::config::{ColumnKind, EntitySchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type DbId = i64;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
/// Catalog-specific payload, kept opaque.
pub type Json = serde_json::Value;

/// An entity kind the resource engine can serve.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path segment and registry key.
    const RESOURCE: &'static str;
    type Create: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Update: Serialize + DeserializeOwned + Default + Send + Sync + 'static;

    fn id(&self) -> DbId;
    fn schema() -> EntitySchema;
}

/// Storage class of a Rust field type.
pub trait ColumnType {
    const KIND: ColumnKind;
    const NULLABLE: bool = false;
}

impl ColumnType for i64 {
    const KIND: ColumnKind = ColumnKind::Integer;
}

impl ColumnType for f64 {
    const KIND: ColumnKind = ColumnKind::Real;
}

impl ColumnType for String {
    const KIND: ColumnKind = ColumnKind::Text;
}

impl ColumnType for Json {
    const KIND: ColumnKind = ColumnKind::Json;
}

impl<T: ColumnType> ColumnType for Option<T> {
    const KIND: ColumnKind = T::KIND;
    const NULLABLE: bool = true;
}

/// A field of an update projection. Presence decides what changes, so
/// `Set(0)`, `Set(String::new())` and, for nullable fields, `Set(None)` are
/// all applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Absent => None,
            Patch::Set(v) => Some(v),
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent => serializer.serialize_none(),
            Patch::Set(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

macro_rules! entity {
    (
        $(#[$meta:meta])*
        $name:ident {
            resource: $resource:literal,
            table: $table:literal,
            create: $create:ident,
            update: $update:ident $(,)?
        }
        fields {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
        schema($s:ident) $schema:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $name {
            pub id: $crate::model::DbId,
            $( $(#[$fmeta])* pub $field: $ty, )*
            pub created_at: $crate::model::Timestamp,
            pub updated_at: Option<$crate::model::Timestamp>,
        }

        #[doc = concat!("Create projection of [`", stringify!($name), "`]: attributes only.")]
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $create {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        #[doc = concat!("Update projection of [`", stringify!($name), "`]: only present fields change.")]
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $update {
            $(
                $(#[$fmeta])*
                #[serde(default, skip_serializing_if = "crate::model::Patch::is_absent")]
                pub $field: $crate::model::Patch<$ty>,
            )*
        }

        impl $crate::model::Resource for $name {
            const RESOURCE: &'static str = $resource;
            type Create = $create;
            type Update = $update;

            fn id(&self) -> $crate::model::DbId {
                self.id
            }

            fn schema() -> $crate::config::EntitySchema {
                let $s = $crate::config::EntitySchema::new(
                    $resource,
                    $table,
                    vec![
                        $(
                            $crate::config::ColumnDef::attribute(
                                stringify!($field),
                                <$ty as $crate::model::ColumnType>::KIND,
                                <$ty as $crate::model::ColumnType>::NULLABLE,
                            ),
                        )*
                    ],
                );
                $schema
            }
        }
    };
}

pub mod card;
pub mod catalog;
pub mod set;

pub use card::*;
pub use catalog::*;
pub use set::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_and_present_fields_are_distinguished() {
        let patch: SetRepresentationUpdate = serde_json::from_value(json!({ "size": 0 })).unwrap();
        assert_eq!(patch.size, Patch::Set(0));
        assert!(patch.name.is_absent());
        assert!(patch.payload.is_absent());
    }

    #[test]
    fn explicit_null_clears_a_nullable_field() {
        let patch: SetRepresentationUpdate = serde_json::from_value(json!({ "payload": null })).unwrap();
        assert_eq!(patch.payload, Patch::Set(None));
    }

    #[test]
    fn explicit_null_on_a_required_field_is_rejected() {
        let result: Result<GameUpdate, _> = serde_json::from_value(json!({ "name": null }));
        assert!(result.is_err());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let patch = CatalogUpdate::default();
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({}));

        let patch = SetRepresentationUpdate {
            payload: Patch::Set(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "payload": null }));
    }

    #[test]
    fn create_projection_refuses_managed_fields() {
        let result: Result<CatalogCreate, _> = serde_json::from_value(json!({ "id": 7, "name": "VendorA" }));
        assert!(result.is_err());
    }

    #[test]
    fn proto_card_create_refuses_set_membership() {
        let result: Result<ProtoCardCreate, _> =
            serde_json::from_value(json!({ "game_id": 1, "name": "Fireball", "proto_set_id": 1 }));
        assert!(result.is_err());
    }

    #[test]
    fn column_kinds_follow_field_types() {
        let schema = SetRepresentation::schema();
        let payload = schema.column("payload").unwrap();
        assert_eq!(payload.kind, ColumnKind::Json);
        assert!(payload.nullable);
        let size = schema.column("size").unwrap();
        assert_eq!(size.kind, ColumnKind::Integer);
        assert!(!size.nullable);
        let names: Vec<_> = schema.columns.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["id", "proto_set_id", "catalog_id", "name", "identifier", "size", "payload", "created_at", "updated_at"]
        );
    }
}
