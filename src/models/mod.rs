use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Discriminator for the two identifier keyspaces.
///
/// Every identifier in the system belongs to exactly one kind; the kind is
/// fixed at creation and serialized as `"mob"` / `"item"` on the wire under
/// the field name `type`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Mob,
    Item,
}

impl IdKind {
    /// Wire representation used in query strings and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Mob => "mob",
            IdKind::Item => "item",
        }
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mob" => Ok(IdKind::Mob),
            "item" => Ok(IdKind::Item),
            _ => Err(()),
        }
    }
}

/// A (kind, numeric id) pair identifying a mob or an item.
///
/// Two TypedIds with equal kind and id are interchangeable everywhere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TypedId {
    #[serde(rename = "type")]
    pub kind: IdKind,
    pub id: i64,
}

impl TypedId {
    pub fn new(kind: IdKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn mob(id: i64) -> Self {
        Self::new(IdKind::Mob, id)
    }

    pub fn item(id: i64) -> Self {
        Self::new(IdKind::Item, id)
    }
}

/// A single row of the relational drop table.
///
/// `chance` is a probability numerator out of a fixed denominator
/// (parts-per-100000); it is stored and forwarded as an opaque integer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct DropRecord {
    pub id: i64,
    #[serde(rename = "dropperid")]
    #[sqlx(rename = "dropperid")]
    pub dropper_id: i64,
    #[serde(rename = "itemid")]
    #[sqlx(rename = "itemid")]
    pub item_id: i64,
    #[serde(rename = "minimum_quantity")]
    #[sqlx(rename = "minimum_quantity")]
    pub min_quantity: i64,
    #[serde(rename = "maximum_quantity")]
    #[sqlx(rename = "maximum_quantity")]
    pub max_quantity: i64,
    #[serde(rename = "questid")]
    #[sqlx(rename = "questid")]
    pub quest_id: i64,
    pub chance: i64,
}

/// Fields accepted when creating or replacing a drop record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropFields {
    #[serde(rename = "dropperid")]
    pub dropper_id: i64,
    #[serde(rename = "itemid")]
    pub item_id: i64,
    #[serde(rename = "minimum_quantity")]
    pub min_quantity: i64,
    #[serde(rename = "maximum_quantity")]
    pub max_quantity: i64,
    #[serde(rename = "questid")]
    pub quest_id: i64,
    pub chance: i64,
}

/// Sentinel substituted when name resolution finds no match.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A drop record enriched with resolved names.
///
/// Ephemeral: constructed per aggregation request, never persisted. The name
/// fields are never null; absence becomes the literal [`UNKNOWN_NAME`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AugmentedDrop {
    pub id: i64,
    #[serde(rename = "dropperid")]
    pub dropper_id: i64,
    pub dropper_name: String,
    #[serde(rename = "itemid")]
    pub item_id: i64,
    pub item_name: String,
    #[serde(rename = "minimum_quantity")]
    pub min_quantity: i64,
    #[serde(rename = "maximum_quantity")]
    pub max_quantity: i64,
    #[serde(rename = "questid")]
    pub quest_id: i64,
    pub chance: i64,
}

impl AugmentedDrop {
    /// Combine a raw record with resolved names, falling back to the sentinel.
    pub fn from_record(
        record: &DropRecord,
        dropper_name: Option<&str>,
        item_name: Option<&str>,
    ) -> Self {
        Self {
            id: record.id,
            dropper_id: record.dropper_id,
            dropper_name: dropper_name.unwrap_or(UNKNOWN_NAME).to_string(),
            item_id: record.item_id,
            item_name: item_name.unwrap_or(UNKNOWN_NAME).to_string(),
            min_quantity: record.min_quantity,
            max_quantity: record.max_quantity,
            quest_id: record.quest_id,
            chance: record.chance,
        }
    }
}

/// Result of merging the image- and drop-existence checks for one TypedId.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExistenceRecord {
    #[serde(flatten)]
    pub typed_id: TypedId,
    #[serde(rename = "image_exist")]
    pub image_exists: bool,
    #[serde(rename = "drop_exist")]
    pub drop_exists: bool,
}

/// One entry of a drop-existence batch response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DropExistence {
    #[serde(flatten)]
    pub typed_id: TypedId,
    #[serde(rename = "drop_exist")]
    pub exists: bool,
}

/// One entry of an image-existence batch response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageExistence {
    #[serde(flatten)]
    pub typed_id: TypedId,
    #[serde(rename = "image_exist")]
    pub exists: bool,
}

// --- Wire shapes shared between the aggregator and its downstream services ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveNamesRequest {
    #[serde(rename = "nameList")]
    pub name_list: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveNamesResponse {
    pub ids: std::collections::HashMap<String, TypedId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveIdsRequest {
    #[serde(rename = "idList")]
    pub id_list: Vec<i64>,
    #[serde(rename = "type")]
    pub kind: IdKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveIdsResponse {
    pub names: std::collections::HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropExistenceRequest {
    pub items: Vec<TypedId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropExistenceResponse {
    pub results: Vec<DropExistence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageExistenceRequest {
    pub images: Vec<TypedId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageExistenceResponse {
    pub results: Vec<ImageExistence>,
}

/// Body of the public augmented-search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<AugmentedDrop>,
}

/// Body of the public existence-check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistenceResponse {
    pub results: Vec<ExistenceRecord>,
}
