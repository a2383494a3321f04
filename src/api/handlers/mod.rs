//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod admin;
pub mod auth;
pub mod cars;
pub mod health;
pub mod payments;
pub mod rentals;

pub use admin::{
    add_car_image_handler, admin_payment_list_handler, admin_rental_list_handler,
    create_car_handler, delete_car_handler, delete_car_image_handler, mark_payment_paid_handler,
    update_car_handler, update_rental_status_handler,
};
pub use auth::{refresh_handler, token_handler};
pub use cars::{car_detail_handler, car_list_handler};
pub use health::health_handler;
pub use payments::create_payment_handler;
pub use rentals::{
    cancel_rental_handler, create_rental_handler, rental_detail_handler, rental_list_handler,
};
