//! Tour packages as returned by the `tour_packages` table with their
//! destination and review rows embedded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the table holding tour packages.
pub const PACKAGE_TABLE: &str = "tour_packages";

/// Embedded-resource select used when listing packages for search.
pub const PACKAGE_SELECT: &str = "*,destinations:destinations(id,name,country,city,\
   destination_type,image_url,latitude,longitude),reviews:reviews(rating)";

/// The destination a package visits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationRef {
  #[serde(default)]
  pub id:               Option<Uuid>,
  #[serde(default)]
  pub name:             Option<String>,
  #[serde(default)]
  pub country:          Option<String>,
  #[serde(default)]
  pub city:             Option<String>,
  #[serde(default)]
  pub destination_type: Option<String>,
  #[serde(default)]
  pub image_url:        Option<String>,
  #[serde(default)]
  pub latitude:         Option<f64>,
  #[serde(default)]
  pub longitude:        Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRef {
  #[serde(default)]
  pub rating: f64,
}

/// A row of `tour_packages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourPackage {
  pub id:               Uuid,
  #[serde(default)]
  pub title:            Option<String>,
  #[serde(default)]
  pub description:      Option<String>,
  #[serde(default)]
  pub price_per_person: Option<f64>,
  #[serde(default)]
  pub min_price:        Option<f64>,
  #[serde(default)]
  pub max_price:        Option<f64>,
  #[serde(default)]
  pub duration_days:    Option<u32>,
  /// Inclusions, shown as activities on destination cards.
  #[serde(default)]
  pub includes:         Option<Vec<String>>,
  #[serde(default)]
  pub image_url:        Option<String>,
  #[serde(default)]
  pub special_offers:   Option<String>,
  #[serde(default)]
  pub is_featured:      bool,
  #[serde(default)]
  pub created_at:       Option<DateTime<Utc>>,
  #[serde(default)]
  pub destinations:     Option<DestinationRef>,
  #[serde(default)]
  pub reviews:          Vec<ReviewRef>,
}

impl TourPackage {
  pub fn new(id: Uuid) -> Self {
    Self {
      id,
      title: None,
      description: None,
      price_per_person: None,
      min_price: None,
      max_price: None,
      duration_days: None,
      includes: None,
      image_url: None,
      special_offers: None,
      is_featured: false,
      created_at: None,
      destinations: None,
      reviews: Vec::new(),
    }
  }

  pub fn review_stats(&self) -> ReviewStats { ReviewStats::of(&self.reviews) }

  /// Mean review rating rounded to one decimal place; `0.0` with no reviews.
  pub fn average_rating(&self) -> f64 { self.review_stats().average }

  pub fn review_count(&self) -> usize { self.reviews.len() }
}

/// Rating summary shown next to a package's reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReviewStats {
  pub total:        usize,
  /// Rounded to one decimal place.
  pub average:      f64,
  /// `distribution[n - 1]` counts reviews rated exactly `n` stars.
  /// Fractional or out-of-range ratings count towards the average only.
  pub distribution: [usize; 5],
}

impl ReviewStats {
  pub fn of(reviews: &[ReviewRef]) -> Self {
    let mut stats = Self {
      total: reviews.len(),
      ..Default::default()
    };
    if reviews.is_empty() {
      return stats;
    }
    let sum: f64 = reviews.iter().map(|r| r.rating).sum();
    stats.average = (sum / reviews.len() as f64 * 10.0).round() / 10.0;
    for review in reviews {
      let stars = review.rating;
      if stars.fract() == 0.0 && (1.0..=5.0).contains(&stars) {
        stats.distribution[stars as usize - 1] += 1;
      }
    }
    stats
  }

  /// Count of reviews with exactly `stars` stars (1 to 5).
  pub fn with_stars(&self, stars: usize) -> usize {
    stars
      .checked_sub(1)
      .and_then(|i| self.distribution.get(i))
      .copied()
      .unwrap_or(0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn average_rating_rounds_to_one_decimal() {
    let mut pkg = TourPackage::new(Uuid::nil());
    assert_eq!(pkg.average_rating(), 0.0);

    pkg.reviews = [5.0, 4.0, 4.0]
      .into_iter()
      .map(|rating| ReviewRef { rating })
      .collect();
    assert_eq!(pkg.average_rating(), 4.3);
    assert_eq!(pkg.review_count(), 3);
  }

  #[test]
  fn stats_distribution_by_star() {
    let reviews: Vec<ReviewRef> = [5.0, 5.0, 4.0, 1.0, 3.5]
      .into_iter()
      .map(|rating| ReviewRef { rating })
      .collect();
    let stats = ReviewStats::of(&reviews);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.average, 3.7);
    assert_eq!(stats.distribution, [1, 0, 0, 1, 2]);
    assert_eq!(stats.with_stars(5), 2);
    assert_eq!(stats.with_stars(0), 0);
    assert_eq!(ReviewStats::of(&[]), ReviewStats::default());
  }

  #[test]
  fn deserialises_embedded_rows() {
    let json = serde_json::json!({
      "id": "6f1c1d4e-8a51-4d4e-9a39-2f0c4b1e9a01",
      "title": "Santorini Sunsets",
      "price_per_person": 1299,
      "duration_days": 7,
      "includes": ["Boat tour", "Wine tasting"],
      "destinations": { "name": "Santorini", "country": "Greece" },
      "reviews": [{ "rating": 5 }, { "rating": 4 }]
    });
    let pkg: TourPackage = serde_json::from_value(json).unwrap();
    assert_eq!(pkg.price_per_person, Some(1299.0));
    assert_eq!(pkg.average_rating(), 4.5);
    assert_eq!(
      pkg.destinations.and_then(|d| d.country).as_deref(),
      Some("Greece")
    );
  }
}
