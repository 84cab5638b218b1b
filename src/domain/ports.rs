use async_trait::async_trait;

use crate::errors::AppError;

use super::cart::CartLineItem;
use super::catalog::{Listing, ListingId, ProximityQuery, Restaurant, RestaurantId};
use super::purchase::{Purchase, PurchasePage, PurchaseRequest};

/// Typed access to the remote cart, restaurant and purchase endpoints.
///
/// Implementations attach the bearer token and carry no business logic.
/// A missing token must fail with [`AppError::AuthMissing`] before any
/// request leaves the process.
#[async_trait]
pub trait RemoteGateway: Send + Sync + 'static {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, AppError>;
    async fn add_to_cart(&self, listing_id: ListingId, quantity: u32) -> Result<(), AppError>;
    async fn update_cart_item(&self, listing_id: ListingId, count: u32) -> Result<(), AppError>;
    async fn remove_from_cart(&self, listing_id: ListingId) -> Result<(), AppError>;

    async fn nearby_restaurants(&self, query: ProximityQuery) -> Result<Vec<Restaurant>, AppError>;
    async fn restaurant_listings(&self, restaurant_id: RestaurantId)
        -> Result<Vec<Listing>, AppError>;

    async fn create_purchase(&self, request: PurchaseRequest) -> Result<Purchase, AppError>;
    async fn active_purchases(&self) -> Result<Vec<Purchase>, AppError>;
    async fn previous_purchases(&self, page: u32, per_page: u32)
        -> Result<PurchasePage, AppError>;
}

/// Supplies the bearer token of the signed-in user, if any.
pub trait TokenSource: Send + Sync + 'static {
    fn token(&self) -> Option<String>;
}
