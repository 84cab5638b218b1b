pub mod cart_store;
pub mod catalog;
pub mod checkout;
pub mod purchase_history;
pub mod reconciler;
pub mod session;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;
