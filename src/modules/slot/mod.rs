pub mod schedule;

mod routes;
pub use routes::get_router;
