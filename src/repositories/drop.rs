//! Drop repository over the relational drop table
//!
//! CRUD plus a batch existence check against `drop_data`. The existence
//! check partitions its input by kind and issues a single UNION ALL of the
//! non-empty per-kind selects, then defaults every unmatched input to
//! `exists=false` while preserving input order 1:1.

use std::collections::HashSet;

use sqlx::{MySql, Pool, QueryBuilder, Row};

use crate::errors::{AppError, AppResult};
use crate::models::{DropExistence, DropFields, DropRecord, IdKind, TypedId};

const DROP_COLUMNS: &str =
    "id, dropperid, itemid, minimum_quantity, maximum_quantity, questid, chance";

/// Repository for drop records.
#[derive(Clone)]
pub struct DropRepository {
    pool: Pool<MySql>,
}

impl DropRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// All drops filtered by dropper id (Mob) or item id (Item).
    pub async fn search_drops(&self, typed_id: TypedId) -> AppResult<Vec<DropRecord>> {
        let field = match typed_id.kind {
            IdKind::Mob => "dropperid",
            IdKind::Item => "itemid",
        };

        let drops = sqlx::query_as::<_, DropRecord>(&format!(
            "SELECT {DROP_COLUMNS} FROM drop_data WHERE {field} = ?"
        ))
        .bind(typed_id.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(drops)
    }

    pub async fn get_drop(&self, id: i64) -> AppResult<Option<DropRecord>> {
        let drop = sqlx::query_as::<_, DropRecord>(&format!(
            "SELECT {DROP_COLUMNS} FROM drop_data WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(drop)
    }

    /// Insert a new record, returning its generated id.
    pub async fn create_drop(&self, fields: &DropFields) -> AppResult<i64> {
        let result = sqlx::query(
            "INSERT INTO drop_data \
             (dropperid, itemid, minimum_quantity, maximum_quantity, questid, chance) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(fields.dropper_id)
        .bind(fields.item_id)
        .bind(fields.min_quantity)
        .bind(fields.max_quantity)
        .bind(fields.quest_id)
        .bind(fields.chance)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Replace all fields of an existing record; NotFound when the id is
    /// absent.
    pub async fn update_drop(&self, id: i64, fields: &DropFields) -> AppResult<()> {
        // MySQL reports zero affected rows for a no-op update, so the
        // absence check has to be separate from the UPDATE itself.
        if self.get_drop(id).await?.is_none() {
            return Err(AppError::not_found("drop record", id.to_string()));
        }

        sqlx::query(
            "UPDATE drop_data \
             SET dropperid = ?, itemid = ?, minimum_quantity = ?, maximum_quantity = ?, \
                 questid = ?, chance = ? \
             WHERE id = ?",
        )
        .bind(fields.dropper_id)
        .bind(fields.item_id)
        .bind(fields.min_quantity)
        .bind(fields.max_quantity)
        .bind(fields.quest_id)
        .bind(fields.chance)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a record; NotFound when the id is absent.
    pub async fn delete_drop(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM drop_data WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("drop record", id.to_string()));
        }

        Ok(())
    }

    /// Batch existence check. Empty input short-circuits with zero queries.
    pub async fn check_existence(&self, items: &[TypedId]) -> AppResult<Vec<DropExistence>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mob_ids: Vec<i64> = items
            .iter()
            .filter(|item| item.kind == IdKind::Mob)
            .map(|item| item.id)
            .collect();
        let item_ids: Vec<i64> = items
            .iter()
            .filter(|item| item.kind == IdKind::Item)
            .map(|item| item.id)
            .collect();

        let mut existing_mobs = HashSet::new();
        let mut existing_items = HashSet::new();

        let mut builder = QueryBuilder::<MySql>::new("");

        if !mob_ids.is_empty() {
            builder
                .push("SELECT 'mob' AS kind, dropperid AS id FROM drop_data WHERE dropperid IN (");
            let mut separated = builder.separated(", ");
            for id in &mob_ids {
                separated.push_bind(*id);
            }
            builder.push(")");
        }

        if !mob_ids.is_empty() && !item_ids.is_empty() {
            builder.push(" UNION ALL ");
        }

        if !item_ids.is_empty() {
            builder.push("SELECT 'item' AS kind, itemid AS id FROM drop_data WHERE itemid IN (");
            let mut separated = builder.separated(", ");
            for id in &item_ids {
                separated.push_bind(*id);
            }
            builder.push(")");
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        for row in rows {
            let kind: String = row.try_get("kind")?;
            let id: i64 = row.try_get("id")?;
            match kind.as_str() {
                "mob" => {
                    existing_mobs.insert(id);
                }
                "item" => {
                    existing_items.insert(id);
                }
                _ => {}
            }
        }

        Ok(merge_existence(items, &existing_mobs, &existing_items))
    }
}

/// Fold the query hits back onto the input, defaulting misses to false and
/// keeping a 1:1 correspondence in input order.
fn merge_existence(
    items: &[TypedId],
    existing_mobs: &HashSet<i64>,
    existing_items: &HashSet<i64>,
) -> Vec<DropExistence> {
    items
        .iter()
        .map(|item| {
            let exists = match item.kind {
                IdKind::Mob => existing_mobs.contains(&item.id),
                IdKind::Item => existing_items.contains(&item.id),
            };
            DropExistence {
                typed_id: *item,
                exists,
            }
        })
        .collect()
}
