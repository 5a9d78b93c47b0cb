//! API endpoints for the Fitbook service.
//!
//! Handlers are organized by domain:
//! - Accounts: signup and login
//! - Classes: scheduling and upcoming listings
//! - Bookings: reserving a seat and booking history

pub mod accounts;
pub mod bookings;
pub mod classes;

pub use accounts::{login_form, login_json, signup};
pub use bookings::{book_class, list_bookings};
pub use classes::{create_class, get_class, list_classes};
