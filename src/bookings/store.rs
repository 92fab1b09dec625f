//! Booking store backed by the JSON data file
//!
//! Id assignment, append and file write happen under one lock so concurrent
//! requests never interleave a read-modify-write. Persistence is
//! best-effort: a failed write is logged and the booking is still returned.

use crate::bookings::types::*;
use crate::storage::{DataDocument, DataFile, Record};
use tokio::sync::Mutex;

/// File-backed booking collection
pub struct BookingStore {
    data: DataFile,
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    doc: DataDocument,
    next_seq: u32,
}

impl BookingStore {
    /// Wrap an already loaded document.
    ///
    /// The sequence continues after the highest existing booking number,
    /// counting records that did not parse.
    pub fn new(data: DataFile, doc: DataDocument) -> Self {
        let highest = doc
            .bookings
            .iter()
            .filter_map(|record| record.booking_id().and_then(parse_booking_seq))
            .max()
            .unwrap_or(0);
        let next_seq = highest.max(doc.bookings.len() as u32) + 1;

        Self {
            data,
            inner: Mutex::new(StoreInner { doc, next_seq }),
        }
    }

    /// Assign the next id, append and persist.
    pub async fn create(&self, new: NewBooking) -> Booking {
        let mut inner = self.inner.lock().await;

        let booking = Booking {
            id: format_booking_id(inner.next_seq),
            trip_id: new.trip_id,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            guests: new.guests,
            notes: new.notes,
            booking_date: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            status: BookingStatus::Confirmed,
        };
        inner.next_seq += 1;
        inner.doc.bookings.push(Record::Parsed(booking.clone()));

        if let Err(e) = self.data.save(&inner.doc).await {
            tracing::warn!(booking_id = %booking.id, "Booking not persisted: {}", e);
        }

        tracing::info!(
            booking_id = %booking.id,
            trip_id = booking.trip_id,
            guests = booking.guests,
            "Booking created"
        );
        booking
    }

    /// List all bookings
    pub async fn list(&self) -> Vec<Booking> {
        self.inner.lock().await.doc.valid_bookings().cloned().collect()
    }

    /// Get a booking by id
    pub async fn get(&self, id: &str) -> Option<Booking> {
        self.inner
            .lock()
            .await
            .doc
            .valid_bookings()
            .find(|b| b.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.doc.valid_bookings().count()
    }
}
