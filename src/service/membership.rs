//! Set membership of a card, derived through its catalog representations.

use crate::config::ID_COLUMN;
use crate::error::AppError;
use crate::model::{CardRepresentation, DbId, ProtoCard, SetRepresentation};
use crate::service::integrity::exists;
use crate::service::ResourceEngine;
use crate::sql::{quoted, SqlValue};
use serde::Serialize;

/// One catalog placing a proto card into a proto set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetMembership {
    pub catalog_id: DbId,
    pub set_representation_id: DbId,
    pub proto_set_id: DbId,
}

impl ResourceEngine {
    /// Follows `CardRepresentation -> SetRepresentation -> ProtoSet` for every
    /// representation of `proto_card_id`. A card with no representation has no sets.
    pub async fn set_membership(&self, proto_card_id: DbId) -> Result<Vec<SetMembership>, AppError> {
        let cards = self.entity::<CardRepresentation>()?;
        let sets = self.entity::<SetRepresentation>()?;
        let proto_cards = self.entity::<ProtoCard>()?;

        let mut tx = self.pool().begin().await?;
        if !exists(&mut tx, proto_cards.table, ID_COLUMN, SqlValue::Integer(proto_card_id)).await? {
            return Err(AppError::NotFound {
                resource: proto_cards.resource,
                id: proto_card_id,
            });
        }
        let sql = format!(
            "SELECT DISTINCT s.\"catalog_id\", s.\"id\", s.\"proto_set_id\" \
             FROM {cards} c JOIN {sets} s ON s.\"id\" = c.\"set_representation_id\" \
             WHERE c.\"proto_card_id\" = $1 \
             ORDER BY s.\"proto_set_id\", s.\"catalog_id\", s.\"id\"",
            cards = quoted(cards.table),
            sets = quoted(sets.table),
        );
        tracing::debug!(sql = %sql, param = proto_card_id, "query");
        let rows = sqlx::query_as::<_, (i64, i64, i64)>(&sql)
            .bind(proto_card_id)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(rows
            .into_iter()
            .map(|(catalog_id, set_representation_id, proto_set_id)| SetMembership {
                catalog_id,
                set_representation_id,
                proto_set_id,
            })
            .collect())
    }
}
