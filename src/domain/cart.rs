use std::fmt;

use bigdecimal::BigDecimal;

use super::catalog::{ListingId, RestaurantId};

/// One (listing, quantity) pair held in the remote cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    /// Server-assigned id of the line.
    pub id: i64,
    pub listing_id: ListingId,
    pub count: u32,
    pub restaurant_id: RestaurantId,
}

/// Which fulfilment path, and therefore which price, applies to the whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FulfilmentMode {
    #[default]
    Pickup,
    Delivery,
}

impl FulfilmentMode {
    pub fn from_is_pickup(is_pickup: bool) -> Self {
        if is_pickup {
            FulfilmentMode::Pickup
        } else {
            FulfilmentMode::Delivery
        }
    }

    pub fn is_pickup(self) -> bool {
        self == FulfilmentMode::Pickup
    }

    pub fn is_delivery(self) -> bool {
        self == FulfilmentMode::Delivery
    }
}

impl fmt::Display for FulfilmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfilmentMode::Pickup => f.write_str("pickup"),
            FulfilmentMode::Delivery => f.write_str("delivery"),
        }
    }
}

/// The three remote calls a quantity change can turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
    Add,
    Update(u32),
    Remove,
}

/// Amounts shown on the checkout screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutTotals {
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
}
