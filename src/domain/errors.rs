use thiserror::Error;

use super::cart::FulfilmentMode;
use super::catalog::{ListingId, RestaurantId};

/// Conflicts detected on the client before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Your cart can only contain items from one restaurant at a time")]
    DifferentRestaurant {
        cart_restaurant: RestaurantId,
        listing_restaurant: RestaurantId,
    },
    #[error("Maximum quantity reached: only {available} left")]
    StockExceeded { listing_id: ListingId, available: u32 },
    #[error("Listing {0} is not offered by the selected restaurant")]
    UnknownListing(ListingId),
    #[error("A cart change for listing {0} is already in progress")]
    MutationInFlight(ListingId),
    #[error("{title} is not available for {mode}")]
    NotOffered { title: String, mode: FulfilmentMode },
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Please select a payment method")]
    PaymentMethodMissing,
    #[error("{0}")]
    RestaurantClosed(String),
    #[error("The restaurant for this cart is no longer nearby")]
    RestaurantUnavailable,
    #[error("This order has already been placed")]
    CheckoutCompleted,
    #[error("Invalid working hours: {0}")]
    InvalidHours(String),
}
