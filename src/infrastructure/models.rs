use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::cart::CartLineItem;
use crate::domain::catalog::{Listing, Restaurant};
use crate::domain::hours::WorkingHours;
use crate::domain::purchase::{Purchase, PurchasePage, PurchaseStatus};

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CartLineItemDto {
    pub id: i64,
    pub listing_id: i64,
    pub count: u32,
    pub restaurant_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListingDto {
    pub id: i64,
    pub restaurant_id: i64,
    pub title: String,
    #[serde(deserialize_with = "price")]
    pub original_price: BigDecimal,
    #[serde(deserialize_with = "price")]
    pub pick_up_price: BigDecimal,
    #[serde(deserialize_with = "price")]
    pub delivery_price: BigDecimal,
    pub count: u32,
    #[serde(default)]
    pub consume_within: Option<String>,
    #[serde(default)]
    pub available_for_pickup: bool,
    #[serde(default)]
    pub available_for_delivery: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default = "zero", deserialize_with = "price", alias = "delivery_fee")]
    pub delivery_fee: BigDecimal,
    #[serde(default, alias = "working_days")]
    pub working_days: Vec<String>,
    #[serde(default, alias = "working_hours_start")]
    pub working_hours_start: Option<String>,
    #[serde(default, alias = "working_hours_end")]
    pub working_hours_end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseDto {
    pub purchase_id: i64,
    pub listing_title: String,
    pub quantity: u32,
    pub status: String,
    pub purchase_date: DateTime<Utc>,
    #[serde(deserialize_with = "price")]
    pub total_price: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct PaginationDto {
    #[serde(rename = "hasNext", alias = "has_next")]
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
pub struct PurchasePageDto {
    pub purchases: Vec<PurchaseDto>,
    pub pagination: PaginationDto,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

// ── Requests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AddToCartBody {
    pub listing_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct UpdateCartBody {
    pub listing_id: i64,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct RemoveFromCartBody {
    pub listing_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatePurchaseBody {
    #[serde(rename = "isDelivery")]
    pub is_delivery: bool,
    pub notes: String,
}

// ── Conversions ──────────────────────────────────────────────────────────────

impl From<CartLineItemDto> for CartLineItem {
    fn from(d: CartLineItemDto) -> Self {
        CartLineItem {
            id: d.id,
            listing_id: d.listing_id,
            count: d.count,
            restaurant_id: d.restaurant_id,
        }
    }
}

impl From<ListingDto> for Listing {
    fn from(d: ListingDto) -> Self {
        Listing {
            id: d.id,
            restaurant_id: d.restaurant_id,
            title: d.title,
            original_price: d.original_price,
            pick_up_price: d.pick_up_price,
            delivery_price: d.delivery_price,
            count: d.count,
            consume_within: d.consume_within,
            available_for_pickup: d.available_for_pickup,
            available_for_delivery: d.available_for_delivery,
        }
    }
}

impl From<RestaurantDto> for Restaurant {
    fn from(d: RestaurantDto) -> Self {
        let hours = match (&d.working_hours_start, &d.working_hours_end) {
            (Some(start), Some(end)) => match WorkingHours::parse(d.working_days.as_slice(), start, end) {
                Ok(hours) => Some(hours),
                Err(e) => {
                    log::warn!("restaurant {}: {e}", d.id);
                    None
                }
            },
            _ => None,
        };
        Restaurant {
            id: d.id,
            name: d.name,
            latitude: d.latitude,
            longitude: d.longitude,
            delivery_fee: d.delivery_fee,
            hours,
        }
    }
}

impl From<PurchaseDto> for Purchase {
    fn from(d: PurchaseDto) -> Self {
        Purchase {
            purchase_id: d.purchase_id,
            listing_title: d.listing_title,
            quantity: d.quantity,
            status: PurchaseStatus::parse(&d.status),
            purchase_date: d.purchase_date,
            total_price: d.total_price,
        }
    }
}

impl From<PurchasePageDto> for PurchasePage {
    fn from(d: PurchasePageDto) -> Self {
        PurchasePage {
            purchases: d.purchases.into_iter().map(Purchase::from).collect(),
            has_next: d.pagination.has_next,
        }
    }
}

impl ErrorBody {
    /// Human-readable message from an error response body, falling back to
    /// the raw text.
    pub fn message_from(text: &str) -> String {
        let parsed: ErrorBody = serde_json::from_str(text).unwrap_or_default();
        parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| text.trim().to_string())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

/// Prices arrive either as JSON numbers or as decimal strings such as "9.99".
/// Numbers are parsed from their textual form so no binary float rounding
/// leaks into the decimal.
fn price<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    let text = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    };
    BigDecimal::from_str(text.trim()).map_err(serde::de::Error::custom)
}
