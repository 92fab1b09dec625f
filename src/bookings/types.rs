//! Booking wire types
//!
//! All types use camelCase JSON serialization.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
}

/// A stored booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub trip_id: u32,
    pub customer_name: String,
    pub customer_email: String,
    pub guests: u32,
    #[serde(default)]
    pub notes: String,
    pub booking_date: String,
    pub status: BookingStatus,
}

/// Format a 1-based sequence number as a booking id
pub fn format_booking_id(seq: u32) -> String {
    format!("BK{:04}", seq)
}

/// Parse the sequence number back out of a booking id
pub fn parse_booking_seq(id: &str) -> Option<u32> {
    id.strip_prefix("BK")?.parse().ok()
}

/// Request body for creating a booking
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub trip_id: Option<u32>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub guests: Option<u32>,
    pub notes: Option<String>,
}

/// Validated booking fields, ready for id assignment
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub trip_id: u32,
    pub customer_name: String,
    pub customer_email: String,
    pub guests: u32,
    pub notes: String,
}

impl CreateBookingRequest {
    /// Check required fields and that the trip exists in `catalog`.
    pub fn validate(self, catalog: &Catalog) -> Result<NewBooking> {
        let trip_id = self
            .trip_id
            .ok_or_else(|| Error::Validation("tripId is required".to_string()))?;
        if catalog.get(trip_id).is_none() {
            return Err(Error::Validation(format!("Unknown tripId {}", trip_id)));
        }

        let customer_name = required(self.customer_name, "customerName")?;
        let customer_email = required(self.customer_email, "customerEmail")?;
        if !customer_email.contains('@') {
            return Err(Error::Validation(format!(
                "customerEmail '{}' is not a valid address",
                customer_email
            )));
        }

        let guests = self.guests.unwrap_or(1);
        if guests == 0 {
            return Err(Error::Validation("guests must be at least 1".to_string()));
        }

        Ok(NewBooking {
            trip_id,
            customer_name,
            customer_email,
            guests,
            notes: self.notes.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Validation(format!("{} is required", field)))
}
