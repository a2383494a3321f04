//! Core domain entities.
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! (`NewCar`, `NewRental`, ...) and partial updates (`CarPatch`).

pub mod car;
pub mod payment;
pub mod rental;
pub mod user;

pub use car::{Car, CarFilter, CarImage, CarPatch, NewCar};
pub use payment::{NewPayment, Payment, PaymentFilter, PaymentMethod};
pub use rental::{NewRental, Rental, RentalDetails, RentalFilter, RentalStatus};
pub use user::{NewUser, User};
