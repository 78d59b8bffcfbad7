//! Event normalizer: untyped webhook payload -> [`ChangeEvent`].
//!
//! This is the only place that touches the raw payload. Everything downstream
//! works with the typed event or with the rejection reason.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

use skusync_core::{InventoryItemId, LocationId};

use crate::ChangeEvent;

pub const FIELD_ITEM_ID: &str = "inventory_item_id";
pub const FIELD_LOCATION_ID: &str = "location_id";
pub const FIELD_AVAILABLE: &str = "available";
pub const FIELD_UPDATED_AT: &str = "updated_at";

/// Why a payload could not be turned into a [`ChangeEvent`].
///
/// A rejection is terminal for the delivery: it is skipped, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// Field absent or explicitly `null`.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid field `{field}`: {detail}")]
    InvalidField { field: &'static str, detail: String },
}

/// Outcome of normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Valid(ChangeEvent),
    Rejected(RejectReason),
}

impl Normalized {
    pub fn into_result(self) -> Result<ChangeEvent, RejectReason> {
        match self {
            Normalized::Valid(ev) => Ok(ev),
            Normalized::Rejected(reason) => Err(reason),
        }
    }
}

/// Validate a raw inventory-levels payload.
///
/// `inventory_item_id`, `location_id` and `available` must all be present and
/// non-null. Ids may be numbers, numeric strings or global ids; `available`
/// must be an integer. No range check is applied to the quantity.
pub fn normalize(payload: &JsonValue) -> Normalized {
    match try_normalize(payload) {
        Ok(ev) => Normalized::Valid(ev),
        Err(reason) => Normalized::Rejected(reason),
    }
}

fn try_normalize(payload: &JsonValue) -> Result<ChangeEvent, RejectReason> {
    let obj = payload.as_object().ok_or(RejectReason::NotAnObject)?;

    let item_raw = required(obj, FIELD_ITEM_ID)?;
    let location_raw = required(obj, FIELD_LOCATION_ID)?;
    let available_raw = required(obj, FIELD_AVAILABLE)?;

    let item_id: InventoryItemId = parse_id(FIELD_ITEM_ID, item_raw)?;
    let location_id: LocationId = parse_id(FIELD_LOCATION_ID, location_raw)?;
    let quantity = available_raw
        .as_i64()
        .ok_or_else(|| RejectReason::InvalidField {
            field: FIELD_AVAILABLE,
            detail: format!("expected integer, got {available_raw}"),
        })?;

    let mut event = ChangeEvent::new(item_id, location_id, quantity);
    // Informational only; a bad timestamp does not invalidate the change.
    if let Some(ts) = obj
        .get(FIELD_UPDATED_AT)
        .and_then(JsonValue::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    {
        event = event.with_updated_at(ts.with_timezone(&Utc));
    }
    Ok(event)
}

fn required<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    field: &'static str,
) -> Result<&'a JsonValue, RejectReason> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Err(RejectReason::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn parse_id<T>(field: &'static str, raw: &JsonValue) -> Result<T, RejectReason>
where
    T: From<u64> + core::str::FromStr<Err = skusync_core::DomainError>,
{
    let invalid = |detail: String| RejectReason::InvalidField { field, detail };
    match raw {
        JsonValue::Number(n) => n
            .as_u64()
            .map(T::from)
            .ok_or_else(|| invalid(format!("expected non-negative integer id, got {n}"))),
        JsonValue::String(s) => s.parse::<T>().map_err(|e| invalid(e.to_string())),
        other => Err(invalid(format!("expected id, got {other}"))),
    }
}
