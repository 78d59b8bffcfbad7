//! Admin GraphQL documents and their wire shapes.

use serde::{Deserialize, Serialize};

use skusync_inventory::{FieldError, ItemQuantity, SetQuantitiesOptions};
use skusync_core::LocationId;

pub const INVENTORY_ITEM_SKU_QUERY: &str = r#"
query InventoryItemSku($id: ID!) {
  inventoryItem(id: $id) {
    id
    sku
  }
}
"#;

pub const VARIANTS_BY_SKU_QUERY: &str = r#"
query VariantsBySku($first: Int!, $query: String!) {
  productVariants(first: $first, query: $query) {
    nodes {
      id
      sku
      inventoryItem {
        id
      }
    }
  }
}
"#;

pub const SET_QUANTITIES_MUTATION: &str = r#"
mutation SetInventoryQuantities($input: InventorySetQuantitiesInput!) {
  inventorySetQuantities(input: $input) {
    userErrors {
      field
      message
    }
  }
}
"#;

/// Search string matching one SKU exactly.
///
/// The value is quoted so SKUs containing spaces, colons or search operators
/// are treated as a single term.
pub fn sku_search_query(sku: &str) -> String {
    let escaped = sku.replace('\\', "\\\\").replace('"', "\\\"");
    format!("sku:\"{escaped}\"")
}

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemSkuData {
    pub inventory_item: Option<InventoryItemNode>,
}

#[derive(Debug, Deserialize)]
pub struct InventoryItemNode {
    pub id: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantsBySkuData {
    pub product_variants: VariantConnection,
}

#[derive(Debug, Deserialize)]
pub struct VariantConnection {
    #[serde(default)]
    pub nodes: Vec<VariantNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: Option<String>,
    pub sku: Option<String>,
    pub inventory_item: Option<InventoryItemNode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantitiesInput {
    pub name: String,
    pub reason: String,
    pub ignore_compare_quantity: bool,
    pub quantities: Vec<QuantityInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityInput {
    pub inventory_item_id: String,
    pub location_id: String,
    pub quantity: i64,
}

impl SetQuantitiesInput {
    pub fn new(
        location_id: &LocationId,
        quantities: &[ItemQuantity],
        options: &SetQuantitiesOptions,
    ) -> Self {
        Self {
            name: options.quantity_name.clone(),
            reason: options.reason.clone(),
            ignore_compare_quantity: options.ignore_compare_quantity,
            quantities: quantities
                .iter()
                .map(|q| QuantityInput {
                    inventory_item_id: q.item_id.to_string(),
                    location_id: location_id.to_string(),
                    quantity: q.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantitiesData {
    pub inventory_set_quantities: Option<SetQuantitiesPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantitiesPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl From<UserError> for FieldError {
    fn from(e: UserError) -> Self {
        FieldError::new(e.field.unwrap_or_default(), e.message)
    }
}
