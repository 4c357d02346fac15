pub mod auth;
pub mod menu;
pub mod order;
pub mod slot;

mod router;
pub use router::get_router;
