//! Booking lists, dashboard statistics and booking references.

use std::{cmp::Ordering, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, package::TourPackage};

/// Name of the table holding bookings.
pub const BOOKING_TABLE: &str = "bookings";

/// Embedded-resource select used when listing a user's bookings.
pub const BOOKING_SELECT: &str = "*,tour_packages:tour_packages(id,title,duration_days,\
   image_url,destinations:destinations(name,country,image_url))";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
  Pending,
  Confirmed,
  Cancelled,
  Completed,
}

impl BookingStatus {
  /// Confirmed and completed bookings count towards revenue.
  pub fn is_billable(self) -> bool { matches!(self, Self::Confirmed | Self::Completed) }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Confirmed => "confirmed",
      Self::Cancelled => "cancelled",
      Self::Completed => "completed",
    }
  }
}

impl FromStr for BookingStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "confirmed" => Ok(Self::Confirmed),
      "cancelled" => Ok(Self::Cancelled),
      "completed" => Ok(Self::Completed),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

/// A row of the `bookings` table, reduced to what the dashboards read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
  pub id:                Uuid,
  #[serde(default)]
  pub user_id:           Option<Uuid>,
  #[serde(default)]
  pub tour_package_id:   Option<Uuid>,
  #[serde(default)]
  pub booking_reference: Option<String>,
  pub status:            BookingStatus,
  #[serde(default)]
  pub departure_date:    Option<NaiveDate>,
  #[serde(default)]
  pub travelers:         Option<u32>,
  #[serde(default)]
  pub total_amount:      f64,
  #[serde(default)]
  pub created_at:        Option<DateTime<Utc>>,
  /// Embedded package, when selected with [`BOOKING_SELECT`].
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tour_packages:     Option<TourPackage>,
}

impl Booking {
  pub fn package_title(&self) -> &str {
    self
      .tour_packages
      .as_ref()
      .and_then(|p| p.title.as_deref())
      .filter(|t| !t.is_empty())
      .unwrap_or("Unknown package")
  }
}

/// Input to a create-booking request. Reference and status are filled in by
/// [`NewBooking::insert`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBooking {
  pub user_id:         Uuid,
  pub tour_package_id: Uuid,
  pub departure_date:  NaiveDate,
  pub travelers:       u32,
  pub total_amount:    f64,
}

/// The row actually inserted: the caller's fields plus a fresh reference,
/// always `pending`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingInsert<'a> {
  #[serde(flatten)]
  pub booking:           &'a NewBooking,
  pub booking_reference: String,
  pub status:            BookingStatus,
}

impl NewBooking {
  pub fn insert(&self, booking_reference: String) -> BookingInsert<'_> {
    BookingInsert {
      booking: self,
      booking_reference,
      status: BookingStatus::Pending,
    }
  }
}

pub fn with_status(bookings: &[Booking], status: Option<BookingStatus>) -> Vec<&Booking> {
  bookings
    .iter()
    .filter(|b| status.is_none_or(|s| b.status == s))
    .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BookingStats {
  pub total:     usize,
  pub pending:   usize,
  pub confirmed: usize,
  pub cancelled: usize,
  pub completed: usize,
  pub revenue:   f64,
}

impl BookingStats {
  pub fn of(bookings: &[Booking]) -> Self {
    let mut stats = Self {
      total: bookings.len(),
      ..Default::default()
    };
    for booking in bookings {
      match booking.status {
        BookingStatus::Pending => stats.pending += 1,
        BookingStatus::Confirmed => stats.confirmed += 1,
        BookingStatus::Cancelled => stats.cancelled += 1,
        BookingStatus::Completed => stats.completed += 1,
      }
      if booking.status.is_billable() {
        stats.revenue += booking.total_amount;
      }
    }
    stats
  }
}

/// Sortable columns of the bookings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingColumn {
  Created,
  Departure,
  Amount,
  Status,
}

impl BookingColumn {
  /// Ascending order for this column; missing dates sort first.
  pub fn compare(&self, a: &Booking, b: &Booking) -> Ordering {
    match self {
      Self::Created => a.created_at.cmp(&b.created_at),
      Self::Departure => a.departure_date.cmp(&b.departure_date),
      Self::Amount => a.total_amount.total_cmp(&b.total_amount),
      Self::Status => a.status.as_str().cmp(b.status.as_str()),
    }
  }
}

impl FromStr for BookingColumn {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "created" => Ok(Self::Created),
      "departure" => Ok(Self::Departure),
      "amount" => Ok(Self::Amount),
      "status" => Ok(Self::Status),
      other => Err(Error::UnknownSort(other.to_owned())),
    }
  }
}

/// `TH` + `yyyymmdd` + four digits drawn from `rng`.
pub fn booking_reference_with(date: NaiveDate, rng: &mut impl RngCore) -> String {
  format!("TH{}{:04}", date.format("%Y%m%d"), rng.next_u32() % 10_000)
}

/// Booking reference for today (UTC) using the OS random source.
pub fn booking_reference() -> String {
  booking_reference_with(Utc::now().date_naive(), &mut OsRng)
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Fixed(u32);

  impl RngCore for Fixed {
    fn next_u32(&mut self) -> u32 { self.0 }

    fn next_u64(&mut self) -> u64 { u64::from(self.0) }

    fn fill_bytes(&mut self, dest: &mut [u8]) { dest.fill(0) }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
      dest.fill(0);
      Ok(())
    }
  }

  fn booking(status: BookingStatus, amount: f64) -> Booking {
    Booking {
      id: Uuid::new_v4(),
      user_id: None,
      tour_package_id: None,
      booking_reference: None,
      status,
      departure_date: None,
      travelers: None,
      total_amount: amount,
      created_at: None,
      tour_packages: None,
    }
  }

  #[test]
  fn stats_count_statuses_and_billable_revenue() {
    let list = vec![
      booking(BookingStatus::Pending, 100.0),
      booking(BookingStatus::Confirmed, 1299.0),
      booking(BookingStatus::Completed, 450.5),
      booking(BookingStatus::Cancelled, 800.0),
      booking(BookingStatus::Confirmed, 200.0),
    ];
    let stats = BookingStats::of(&list);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.confirmed, 2);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.revenue, 1949.5);

    assert_eq!(with_status(&list, Some(BookingStatus::Confirmed)).len(), 2);
    assert_eq!(with_status(&list, None).len(), 5);
  }

  #[test]
  fn reference_is_zero_padded() {
    let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
    assert_eq!(booking_reference_with(date, &mut Fixed(42)), "TH202507040042");
    assert_eq!(booking_reference_with(date, &mut Fixed(123_456)), "TH202507043456");
  }

  #[test]
  fn live_reference_shape() {
    let reference = booking_reference();
    assert_eq!(reference.len(), 14);
    assert!(reference.starts_with("TH"));
    assert!(reference[2..].chars().all(|c| c.is_ascii_digit()));
  }

  #[test]
  fn insert_row_is_pending_with_reference() {
    let new = NewBooking {
      user_id:         Uuid::nil(),
      tour_package_id: Uuid::nil(),
      departure_date:  NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
      travelers:       2,
      total_amount:    2598.0,
    };
    let json = serde_json::to_value(new.insert("TH202507040042".into())).unwrap();
    assert_eq!(json["status"], "pending");
    assert_eq!(json["booking_reference"], "TH202507040042");
    assert_eq!(json["departure_date"], "2025-09-01");
    assert_eq!(json["travelers"], 2);
  }

  #[test]
  fn row_with_embedded_package() {
    let row: Booking = serde_json::from_value(serde_json::json!({
      "id": Uuid::nil(),
      "status": "confirmed",
      "total_amount": 1299.0,
      "tour_packages": { "id": Uuid::nil(), "title": "Santorini Sunsets" },
    }))
    .unwrap();
    assert_eq!(row.package_title(), "Santorini Sunsets");
    assert_eq!(booking(BookingStatus::Pending, 0.0).package_title(), "Unknown package");
  }

  #[test]
  fn columns_sort_ascending() {
    let mut list = vec![
      booking(BookingStatus::Pending, 300.0),
      booking(BookingStatus::Cancelled, 100.0),
      booking(BookingStatus::Confirmed, 200.0),
    ];
    list.sort_by(|a, b| BookingColumn::Amount.compare(a, b));
    let amounts: Vec<f64> = list.iter().map(|b| b.total_amount).collect();
    assert_eq!(amounts, [100.0, 200.0, 300.0]);

    list.sort_by(|a, b| "status".parse::<BookingColumn>().unwrap().compare(a, b));
    assert_eq!(list[0].status, BookingStatus::Cancelled);
    assert!("price".parse::<BookingColumn>().is_err());
  }
}
