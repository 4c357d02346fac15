pub mod database;
pub mod notification;
pub mod validation;
