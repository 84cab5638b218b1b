//! Derives a consistent cart view from independently fetched cart and catalog
//! data. Nothing here is stored; callers recompute on every read.

use bigdecimal::BigDecimal;

use crate::domain::cart::{CartLineItem, CartMutation, FulfilmentMode};
use crate::domain::catalog::{Listing, ListingId, Restaurant, RestaurantId};
use crate::domain::errors::DomainError;

use super::cart_store::CartState;
use super::catalog::CatalogState;

/// A catalog listing joined with the quantity held in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartEntry {
    pub listing: Listing,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestaurantResolution {
    EmptyCart,
    Resolved(Restaurant),
    /// The cart's restaurant is not among the nearby restaurants any more.
    NotInProximity(RestaurantId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub entries: Vec<CartEntry>,
    pub restaurant: RestaurantResolution,
    /// Fulfilment mode selected when the view was derived.
    pub mode: FulfilmentMode,
}

impl CartView {
    pub fn derive(cart: &CartState, catalog: &CatalogState) -> Self {
        let items = &cart.cart_items;
        let entries = listings_in_cart(&catalog.listings, items)
            .into_iter()
            .map(|listing| CartEntry {
                quantity: line_count(items, listing.id).unwrap_or(1),
                listing: listing.clone(),
            })
            .collect();
        let restaurant = match resolve_restaurant(&catalog.restaurants, items) {
            None => RestaurantResolution::EmptyCart,
            Some(Ok(r)) => RestaurantResolution::Resolved(r.clone()),
            Some(Err(id)) => RestaurantResolution::NotInProximity(id),
        };
        Self {
            entries,
            restaurant,
            mode: catalog.mode,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn restaurant(&self) -> Option<&Restaurant> {
        match &self.restaurant {
            RestaurantResolution::Resolved(r) => Some(r),
            _ => None,
        }
    }

    /// The cart references a restaurant that can no longer serve it.
    pub fn is_orphaned(&self) -> bool {
        matches!(self.restaurant, RestaurantResolution::NotInProximity(_))
    }

    /// First entry the restaurant does not offer in the view's mode.
    pub fn unavailable_entry(&self) -> Option<&CartEntry> {
        self.entries
            .iter()
            .find(|e| !e.listing.available_for(self.mode))
    }

    pub fn total(&self, mode: FulfilmentMode) -> BigDecimal {
        self.entries
            .iter()
            .map(|e| e.listing.price(mode).clone() * BigDecimal::from(e.quantity))
            .sum()
    }
}

/// Catalog listings referenced by at least one line item. Line items whose
/// listing is missing from the catalog are skipped.
pub fn listings_in_cart<'a>(listings: &'a [Listing], items: &[CartLineItem]) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| items.iter().any(|item| item.listing_id == listing.id))
        .collect()
}

/// `None` for an empty cart, otherwise the restaurant of the first line item
/// or its id when it is not among `restaurants`.
pub fn resolve_restaurant<'a>(
    restaurants: &'a [Restaurant],
    items: &[CartLineItem],
) -> Option<Result<&'a Restaurant, RestaurantId>> {
    let first = items.first()?;
    Some(
        restaurants
            .iter()
            .find(|r| r.id == first.restaurant_id)
            .ok_or(first.restaurant_id),
    )
}

/// Count stored on the first line item for `listing_id`.
pub fn line_count(items: &[CartLineItem], listing_id: ListingId) -> Option<u32> {
    items
        .iter()
        .find(|item| item.listing_id == listing_id)
        .map(|item| item.count)
}

pub fn count_in_cart(items: &[CartLineItem], listing_id: ListingId) -> u32 {
    items
        .iter()
        .filter(|item| item.listing_id == listing_id)
        .map(|item| item.count)
        .sum()
}

/// Checks run before an add-to-cart request is sent.
pub fn check_add(items: &[CartLineItem], listing: &Listing) -> Result<(), DomainError> {
    if let Some(first) = items.first() {
        if first.restaurant_id != listing.restaurant_id {
            return Err(DomainError::DifferentRestaurant {
                cart_restaurant: first.restaurant_id,
                listing_restaurant: listing.restaurant_id,
            });
        }
    }
    if count_in_cart(items, listing.id) >= listing.count {
        return Err(DomainError::StockExceeded {
            listing_id: listing.id,
            available: listing.count,
        });
    }
    Ok(())
}

pub fn check_target_quantity(listing: &Listing, target: u32) -> Result<(), DomainError> {
    if target > listing.count {
        return Err(DomainError::StockExceeded {
            listing_id: listing.id,
            available: listing.count,
        });
    }
    Ok(())
}

/// Maps a quantity change onto the remote call that performs it. A change to
/// zero always removes the line rather than updating it to zero.
pub fn plan_quantity_change(current: u32, target: u32) -> Option<CartMutation> {
    match (current, target) {
        (c, t) if c == t => None,
        (0, _) => Some(CartMutation::Add),
        (_, 0) => Some(CartMutation::Remove),
        (_, t) => Some(CartMutation::Update(t)),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::application::test_support::{cart_item, listing, restaurant};

    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).expect("valid decimal")
    }

    fn cart(items: Vec<CartLineItem>) -> CartState {
        CartState {
            cart_items: items,
            ..CartState::default()
        }
    }

    fn catalog(listings: Vec<Listing>, restaurants: Vec<Restaurant>) -> CatalogState {
        CatalogState {
            listings,
            restaurants,
            ..CatalogState::default()
        }
    }

    #[test]
    fn empty_cart_has_no_listings_and_no_restaurant() {
        let listings = vec![listing(1, 1, "10", "12", 5)];
        let view = CartView::derive(&cart(vec![]), &catalog(listings, vec![restaurant(1)]));

        assert!(view.is_empty());
        assert_eq!(view.restaurant, RestaurantResolution::EmptyCart);
        assert_eq!(view.total(FulfilmentMode::Pickup), dec("0"));
    }

    #[test]
    fn listings_in_cart_is_the_intersection() {
        let listings = vec![
            listing(1, 1, "10", "12", 5),
            listing(2, 1, "3", "4", 5),
            listing(3, 1, "7", "8", 5),
        ];
        let items = vec![cart_item(3, 1, 1), cart_item(1, 2, 1)];

        let ids: Vec<_> = listings_in_cart(&listings, &items)
            .iter()
            .map(|l| l.id)
            .collect();

        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn cart_items_missing_from_catalog_are_excluded() {
        let listings = vec![listing(1, 1, "10", "12", 5)];
        let items = vec![cart_item(1, 1, 1), cart_item(42, 3, 1)];

        let found = listings_in_cart(&listings, &items);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn pickup_and_delivery_totals() {
        let listings = vec![listing(1, 1, "10", "12", 5)];
        let items = vec![cart_item(1, 2, 1)];

        let view = CartView::derive(&cart(items), &catalog(listings, vec![restaurant(1)]));
        assert_eq!(view.total(FulfilmentMode::Pickup), dec("20"));
        assert_eq!(view.total(FulfilmentMode::Delivery), dec("24"));
    }

    #[test]
    fn pickup_only_listing_is_flagged_for_delivery() {
        let mut pickup_only = listing(1, 1, "10", "12", 5);
        pickup_only.available_for_delivery = false;
        let items = vec![cart_item(1, 1, 1)];
        let mut catalog = catalog(vec![pickup_only], vec![restaurant(1)]);

        let view = CartView::derive(&cart(items.clone()), &catalog);
        assert_eq!(view.mode, FulfilmentMode::Pickup);
        assert!(view.unavailable_entry().is_none());

        catalog.mode = FulfilmentMode::Delivery;
        let view = CartView::derive(&cart(items), &catalog);
        assert_eq!(view.unavailable_entry().map(|e| e.listing.id), Some(1));
    }

    #[test]
    fn resolves_restaurant_of_first_line_item() {
        let items = vec![cart_item(1, 1, 2)];
        let restaurants = vec![restaurant(1), restaurant(2)];

        let resolved = resolve_restaurant(&restaurants, &items);

        assert_eq!(resolved.map(|r| r.map(|r| r.id)), Some(Ok(2)));
    }

    #[test]
    fn restaurant_out_of_proximity_marks_cart_orphaned() {
        let view = CartView::derive(
            &cart(vec![cart_item(1, 1, 9)]),
            &catalog(vec![listing(1, 9, "1", "1", 1)], vec![restaurant(1)]),
        );

        assert_eq!(view.restaurant, RestaurantResolution::NotInProximity(9));
        assert!(view.is_orphaned());
        assert!(view.restaurant().is_none());
    }

    #[test]
    fn add_from_other_restaurant_is_rejected() {
        let items = vec![cart_item(1, 1, 1)];
        let candidate = listing(5, 2, "3", "4", 10);

        let err = check_add(&items, &candidate).unwrap_err();

        assert_eq!(
            err,
            DomainError::DifferentRestaurant {
                cart_restaurant: 1,
                listing_restaurant: 2,
            }
        );
    }

    #[test]
    fn add_beyond_stock_is_rejected() {
        let items = vec![cart_item(5, 2, 1)];
        let candidate = listing(5, 1, "3", "4", 2);

        let err = check_add(&items, &candidate).unwrap_err();

        assert_eq!(
            err,
            DomainError::StockExceeded {
                listing_id: 5,
                available: 2,
            }
        );
    }

    #[test]
    fn add_to_empty_cart_is_allowed() {
        assert!(check_add(&[], &listing(5, 1, "3", "4", 1)).is_ok());
    }

    #[test]
    fn sold_out_listing_cannot_be_added() {
        assert!(check_add(&[], &listing(5, 1, "3", "4", 0)).is_err());
    }

    #[test]
    fn quantity_changes_map_to_add_update_remove() {
        assert_eq!(plan_quantity_change(0, 1), Some(CartMutation::Add));
        assert_eq!(plan_quantity_change(1, 2), Some(CartMutation::Update(2)));
        assert_eq!(plan_quantity_change(3, 1), Some(CartMutation::Update(1)));
        assert_eq!(plan_quantity_change(1, 0), Some(CartMutation::Remove));
        assert_eq!(plan_quantity_change(4, 0), Some(CartMutation::Remove));
        assert_eq!(plan_quantity_change(2, 2), None);
    }

    #[test]
    fn target_above_stock_is_rejected() {
        let candidate = listing(5, 1, "3", "4", 3);
        assert!(check_target_quantity(&candidate, 3).is_ok());
        assert!(check_target_quantity(&candidate, 4).is_err());
    }
}
