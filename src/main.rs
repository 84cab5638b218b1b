use std::error::Error;

use cart_checkout::config::device_location_from_env;
use cart_checkout::{connect, CheckoutMachine, ClientConfig};
use chrono::Local;
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ClientConfig::from_env()?;
    let (latitude, longitude) = device_location_from_env()?;
    let (session, _tokens) = connect(&config)?;

    log::info!("Using API at {}", config.api_base_url);

    session
        .fetch_nearby_restaurants(config.proximity(latitude, longitude))
        .await?;
    session.refresh_for_checkout().await?;

    let view = session.cart_view();
    if view.is_orphaned() {
        session.discard_orphaned_cart();
        return Ok(());
    }
    if view.is_empty() {
        log::info!("Cart is empty");
        return Ok(());
    }

    for entry in &view.entries {
        log::info!("{} x{}", entry.listing.title, entry.quantity);
    }

    let mode = session.mode();
    let totals = CheckoutMachine::totals(&view, mode);
    log::info!(
        "Subtotal {} + delivery {} = {}",
        totals.subtotal,
        totals.delivery_fee,
        totals.total
    );

    let now = Local::now().naive_local();
    match CheckoutMachine::hours_status(&view, now) {
        Some(status) => log::info!("{}", status.message()),
        None => log::warn!("Opening hours unknown; checkout is blocked"),
    }

    Ok(())
}
