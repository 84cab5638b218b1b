use bigdecimal::BigDecimal;

use super::cart::FulfilmentMode;
use super::hours::WorkingHours;

pub type ListingId = i64;
pub type RestaurantId = i64;

/// A discounted food item offered by a restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub restaurant_id: RestaurantId,
    pub title: String,
    pub original_price: BigDecimal,
    pub pick_up_price: BigDecimal,
    pub delivery_price: BigDecimal,
    /// Units still available for ordering.
    pub count: u32,
    pub consume_within: Option<String>,
    pub available_for_pickup: bool,
    pub available_for_delivery: bool,
}

impl Listing {
    pub fn price(&self, mode: FulfilmentMode) -> &BigDecimal {
        match mode {
            FulfilmentMode::Pickup => &self.pick_up_price,
            FulfilmentMode::Delivery => &self.delivery_price,
        }
    }

    pub fn available_for(&self, mode: FulfilmentMode) -> bool {
        match mode {
            FulfilmentMode::Pickup => self.available_for_pickup,
            FulfilmentMode::Delivery => self.available_for_delivery,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub delivery_fee: BigDecimal,
    /// `None` when the server sent hours that could not be parsed.
    pub hours: Option<WorkingHours>,
}

/// Location-radius query used to list nearby restaurants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}
