//! Admin GraphQL API client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use skusync_core::{InventoryItemId, LocationId};
use skusync_inventory::{
    CatalogApi, CatalogError, CatalogItem, FieldError, ItemQuantity, SetQuantitiesOptions, Sku,
};

use crate::config::ShopConfig;

use super::graphql::{
    self, GraphQlRequest, GraphQlResponse, InventoryItemSkuData, SetQuantitiesData,
    SetQuantitiesInput, VariantsBySkuData,
};

const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Catalog backed by one shop's Admin GraphQL API.
///
/// One instance per shop; the access token is fixed at construction.
#[derive(Debug, Clone)]
pub struct ShopifyCatalog {
    http: reqwest::Client,
    endpoint: String,
}

impl ShopifyCatalog {
    pub fn new(shop: &ShopConfig, timeout: Duration) -> Result<Self, CatalogError> {
        Self::with_endpoint(shop.graphql_endpoint(), &shop.access_token, timeout)
    }

    /// Client for an explicit endpoint URL (proxies, local fakes).
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let mut token = HeaderValue::from_str(access_token)
            .map_err(|e| CatalogError::transport(format!("invalid access token: {e}")))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<V, T>(&self, op: &'static str, query: &str, variables: V) -> Result<T, CatalogError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| CatalogError::transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(op, status = status.as_u16(), "catalog request rejected");
            return Err(CatalogError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQlResponse<T> = resp
            .json()
            .await
            .map_err(|e| CatalogError::malformed(e.to_string()))?;

        debug!(op, elapsed_ms = started.elapsed().as_millis() as u64, "catalog request done");

        if !body.errors.is_empty() {
            return Err(CatalogError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        body.data
            .ok_or_else(|| CatalogError::malformed(format!("{op}: response has no data")))
    }
}

#[async_trait]
impl CatalogApi for ShopifyCatalog {
    async fn resolve_sku(&self, item_id: &InventoryItemId) -> Result<Option<String>, CatalogError> {
        let data: InventoryItemSkuData = self
            .execute(
                "resolve_sku",
                graphql::INVENTORY_ITEM_SKU_QUERY,
                json!({ "id": item_id.as_str() }),
            )
            .await?;

        Ok(data.inventory_item.and_then(|item| item.sku))
    }

    async fn find_siblings(&self, sku: &Sku, limit: usize) -> Result<Vec<CatalogItem>, CatalogError> {
        let data: VariantsBySkuData = self
            .execute(
                "find_siblings",
                graphql::VARIANTS_BY_SKU_QUERY,
                json!({ "first": limit, "query": graphql::sku_search_query(sku.as_str()) }),
            )
            .await?;

        Ok(data
            .product_variants
            .nodes
            .into_iter()
            .map(|node| CatalogItem {
                item_id: node
                    .inventory_item
                    .and_then(|item| item.id)
                    .and_then(|id| id.parse().ok()),
                sku: node.sku,
            })
            .collect())
    }

    async fn set_quantities(
        &self,
        location_id: &LocationId,
        quantities: &[ItemQuantity],
        options: &SetQuantitiesOptions,
    ) -> Result<Vec<FieldError>, CatalogError> {
        let input = SetQuantitiesInput::new(location_id, quantities, options);
        let data: SetQuantitiesData = self
            .execute(
                "set_quantities",
                graphql::SET_QUANTITIES_MUTATION,
                json!({ "input": input }),
            )
            .await?;

        let payload = data.inventory_set_quantities.ok_or_else(|| {
            CatalogError::malformed("set_quantities: inventorySetQuantities is null")
        })?;
        Ok(payload.user_errors.into_iter().map(FieldError::from).collect())
    }
}
