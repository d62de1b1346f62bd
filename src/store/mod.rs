//! In-memory order storage shared by all requests.

mod order_store;

pub use order_store::{OrderStore, SharedOrderStore};
