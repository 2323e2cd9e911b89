//! Search orchestration over the downstream service clients
//!
//! Stateless coordination of the name resolver, drop repository, and image
//! retriever. Two composite queries are offered: augmented drop search by
//! name, and existence aggregation by name. In both, the independent
//! downstream calls fan out with `try_join!`, so they run concurrently and
//! the first hard error aborts the whole orchestration (the sibling future
//! is dropped). Logical absence never aborts anything: an unknown name is an
//! empty result, and ids missing from a resolved map become the sentinel
//! name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::{DropService, ImageService, NameResolver};
use crate::errors::AppResult;
use crate::models::{AugmentedDrop, ExistenceRecord, IdKind, TypedId};

/// Coordinates the three downstream services behind the aggregator.
#[derive(Clone)]
pub struct SearchOrchestrator {
    names: Arc<dyn NameResolver>,
    drops: Arc<dyn DropService>,
    images: Arc<dyn ImageService>,
}

impl SearchOrchestrator {
    pub fn new(
        names: Arc<dyn NameResolver>,
        drops: Arc<dyn DropService>,
        images: Arc<dyn ImageService>,
    ) -> Self {
        Self {
            names,
            drops,
            images,
        }
    }

    /// Search drops by name and enrich each record with resolved names.
    ///
    /// Returns the drops in the order the repository produced them. An
    /// unknown name or a mob with no drops yields an empty list.
    pub async fn search_and_augment(&self, name: &str) -> AppResult<Vec<AugmentedDrop>> {
        let Some(typed_id) = self.names.resolve_name_to_id(name).await? else {
            return Ok(Vec::new());
        };

        let drops = self.drops.search_drops(typed_id).await?;
        if drops.is_empty() {
            return Ok(Vec::new());
        }

        let dropper_ids = distinct(drops.iter().map(|d| d.dropper_id));
        let item_ids = distinct(drops.iter().map(|d| d.item_id));

        // No data dependency between the two lookups; resolve both keyspaces
        // concurrently.
        let (dropper_names, item_names) = tokio::try_join!(
            self.names.resolve_ids_to_names(&dropper_ids, IdKind::Mob),
            self.names.resolve_ids_to_names(&item_ids, IdKind::Item),
        )?;

        Ok(drops
            .iter()
            .map(|record| {
                AugmentedDrop::from_record(
                    record,
                    dropper_names
                        .get(&record.dropper_id.to_string())
                        .map(String::as_str),
                    item_names
                        .get(&record.item_id.to_string())
                        .map(String::as_str),
                )
            })
            .collect())
    }

    /// Check image and drop existence for every id sharing the given name.
    ///
    /// The output covers the union of keys reported by either check, in
    /// first-seen order (image results first). A key present in only one
    /// source gets the other flag defaulted to false.
    pub async fn aggregate_existence(&self, name: &str) -> AppResult<Vec<ExistenceRecord>> {
        let id_pairs = self.names.ids_for_name(name).await?;
        if id_pairs.is_empty() {
            return Ok(Vec::new());
        }

        let (image_results, drop_results) = tokio::try_join!(
            self.images.check_images_exist(&id_pairs),
            self.drops.check_drops_exist(&id_pairs),
        )?;

        let mut index: HashMap<TypedId, usize> = HashMap::new();
        let mut records: Vec<ExistenceRecord> = Vec::new();

        for image in image_results {
            let slot = *index.entry(image.typed_id).or_insert_with(|| {
                records.push(ExistenceRecord {
                    typed_id: image.typed_id,
                    image_exists: false,
                    drop_exists: false,
                });
                records.len() - 1
            });
            records[slot].image_exists = image.exists;
        }

        for drop in drop_results {
            let slot = *index.entry(drop.typed_id).or_insert_with(|| {
                records.push(ExistenceRecord {
                    typed_id: drop.typed_id,
                    image_exists: false,
                    drop_exists: false,
                });
                records.len() - 1
            });
            records[slot].drop_exists = drop.exists;
        }

        Ok(records)
    }
}

/// Distinct values preserving first-seen order.
fn distinct(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
