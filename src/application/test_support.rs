use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use crate::domain::cart::CartLineItem;
use crate::domain::catalog::{Listing, ListingId, ProximityQuery, Restaurant, RestaurantId};
use crate::domain::hours::WorkingHours;
use crate::domain::ports::RemoteGateway;
use crate::domain::purchase::{Purchase, PurchasePage, PurchaseRequest, PurchaseStatus};
use crate::errors::AppError;

pub(crate) fn dec(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw).expect("valid decimal")
}

pub(crate) fn listing(
    id: ListingId,
    restaurant_id: RestaurantId,
    pick_up_price: &str,
    delivery_price: &str,
    count: u32,
) -> Listing {
    Listing {
        id,
        restaurant_id,
        title: format!("Surprise bag {id}"),
        original_price: dec("20"),
        pick_up_price: dec(pick_up_price),
        delivery_price: dec(delivery_price),
        count,
        consume_within: Some("today".to_string()),
        available_for_pickup: true,
        available_for_delivery: true,
    }
}

/// Open every day from 08:00 to 22:00 with a 2.50 delivery fee.
pub(crate) fn restaurant(id: RestaurantId) -> Restaurant {
    Restaurant {
        id,
        name: format!("Restaurant {id}"),
        latitude: 52.37,
        longitude: 4.89,
        delivery_fee: dec("2.50"),
        hours: Some(
            WorkingHours::parse(
                &[
                    "Monday",
                    "Tuesday",
                    "Wednesday",
                    "Thursday",
                    "Friday",
                    "Saturday",
                    "Sunday",
                ],
                "08:00",
                "22:00",
            )
            .expect("valid hours"),
        ),
    }
}

pub(crate) fn cart_item(listing_id: ListingId, count: u32, restaurant_id: RestaurantId) -> CartLineItem {
    CartLineItem {
        id: listing_id * 100,
        listing_id,
        count,
        restaurant_id,
    }
}

pub(crate) fn purchase(purchase_id: i64, status: &str) -> Purchase {
    Purchase {
        purchase_id,
        listing_title: format!("Order {purchase_id}"),
        quantity: 1,
        status: PurchaseStatus::parse(status),
        purchase_date: Utc
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
        total_price: dec("9.50"),
    }
}

pub(crate) fn query() -> ProximityQuery {
    ProximityQuery {
        latitude: 52.37,
        longitude: 4.89,
        radius_km: 5.0,
    }
}

/// Holds the next matching call until `release` is notified.
pub(crate) struct CallHold {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// In-memory stand-in for the remote API that behaves like the server: the
/// cart lives here and every call is recorded.
#[derive(Default)]
pub(crate) struct FakeGateway {
    pub signed_out: Mutex<bool>,
    pub cart: Mutex<Vec<CartLineItem>>,
    pub listings: Mutex<Vec<Listing>>,
    pub restaurants: Mutex<Vec<Restaurant>>,
    pub active: Mutex<Vec<Purchase>>,
    pub previous_pages: Mutex<Vec<PurchasePage>>,
    pub purchase_rejection: Mutex<Option<String>>,
    pub fail_mutations: Mutex<Option<String>>,
    pub fetch_hold: Mutex<Option<CallHold>>,
    /// Applied to the server cart first, then held before responding.
    pub mutation_hold: Mutex<Option<CallHold>>,
    pub purchase_hold: Mutex<Option<CallHold>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub(crate) fn with_catalog(restaurants: Vec<Restaurant>, listings: Vec<Listing>) -> Self {
        let gateway = Self::default();
        *gateway.restaurants.lock().unwrap() = restaurants;
        *gateway.listings.lock().unwrap() = listings;
        gateway
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn mutation_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("cart/"))
            .collect()
    }

    fn record(&self, call: String) -> Result<(), AppError> {
        if *self.signed_out.lock().unwrap() {
            return Err(AppError::AuthMissing);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn mutation_failure(&self) -> Result<(), AppError> {
        match self.fail_mutations.lock().unwrap().clone() {
            Some(message) => Err(AppError::ServerRejection {
                status: 400,
                message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, AppError> {
        self.record("fetch_cart".to_string())?;
        let snapshot = self.cart.lock().unwrap().clone();
        pause(&self.fetch_hold).await;
        Ok(snapshot)
    }

    async fn add_to_cart(&self, listing_id: ListingId, quantity: u32) -> Result<(), AppError> {
        self.record(format!("cart/add {listing_id} x{quantity}"))?;
        self.mutation_failure()?;
        let restaurant_id = self
            .listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == listing_id)
            .map(|l| l.restaurant_id)
            .unwrap_or_default();
        {
            let mut cart = self.cart.lock().unwrap();
            match cart.iter_mut().find(|i| i.listing_id == listing_id) {
                Some(line) => line.count += quantity,
                None => cart.push(cart_item(listing_id, quantity, restaurant_id)),
            }
        }
        pause(&self.mutation_hold).await;
        Ok(())
    }

    async fn update_cart_item(&self, listing_id: ListingId, count: u32) -> Result<(), AppError> {
        self.record(format!("cart/update {listing_id} ={count}"))?;
        self.mutation_failure()?;
        if let Some(line) = self
            .cart
            .lock()
            .unwrap()
            .iter_mut()
            .find(|i| i.listing_id == listing_id)
        {
            line.count = count;
        }
        pause(&self.mutation_hold).await;
        Ok(())
    }

    async fn remove_from_cart(&self, listing_id: ListingId) -> Result<(), AppError> {
        self.record(format!("cart/remove {listing_id}"))?;
        self.mutation_failure()?;
        self.cart.lock().unwrap().retain(|i| i.listing_id != listing_id);
        pause(&self.mutation_hold).await;
        Ok(())
    }

    async fn nearby_restaurants(&self, _query: ProximityQuery) -> Result<Vec<Restaurant>, AppError> {
        self.record("restaurants/proximity".to_string())?;
        Ok(self.restaurants.lock().unwrap().clone())
    }

    async fn restaurant_listings(&self, restaurant_id: RestaurantId) -> Result<Vec<Listing>, AppError> {
        self.record(format!("restaurants/{restaurant_id}/listings"))?;
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.restaurant_id == restaurant_id)
            .cloned()
            .collect())
    }

    async fn create_purchase(&self, request: PurchaseRequest) -> Result<Purchase, AppError> {
        self.record(format!(
            "purchases delivery={} notes={}",
            request.is_delivery, request.notes
        ))?;
        if let Some(message) = self.purchase_rejection.lock().unwrap().clone() {
            return Err(AppError::ServerRejection {
                status: 409,
                message,
            });
        }
        let created = purchase(1000, "PENDING");
        self.cart.lock().unwrap().clear();
        self.active.lock().unwrap().push(created.clone());
        pause(&self.purchase_hold).await;
        Ok(created)
    }

    async fn active_purchases(&self) -> Result<Vec<Purchase>, AppError> {
        self.record("purchases/active".to_string())?;
        Ok(self.active.lock().unwrap().clone())
    }

    async fn previous_purchases(&self, page: u32, per_page: u32) -> Result<PurchasePage, AppError> {
        self.record(format!("purchases/previous page={page} per_page={per_page}"))?;
        let pages = self.previous_pages.lock().unwrap();
        let index = usize::try_from(page.saturating_sub(1)).unwrap_or_default();
        Ok(pages.get(index).cloned().unwrap_or(PurchasePage {
            purchases: vec![],
            has_next: false,
        }))
    }
}

async fn pause(slot: &Mutex<Option<CallHold>>) {
    let hold = slot.lock().unwrap().take();
    if let Some(hold) = hold {
        hold.started.notify_one();
        hold.release.notified().await;
    }
}
