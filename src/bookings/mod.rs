//! Trip bookings
//!
//! Bookings are appended to the shared JSON data file with sequential
//! `BK0001`-style ids.

pub mod handler;
pub mod store;
pub mod types;

pub use handler::{bookings_router, BookingsState};
pub use store::BookingStore;
pub use types::{Booking, BookingStatus, CreateBookingRequest, NewBooking};
