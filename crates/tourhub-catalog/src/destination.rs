//! Destination cards and the search-page filter/sort pipeline.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, package::TourPackage};

pub const UNKNOWN_DESTINATION: &str = "Unknown Destination";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
pub const DEFAULT_DESCRIPTION: &str = "Discover amazing experiences at this destination.";
pub const DEFAULT_IMAGE: &str =
  "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=500&h=300&fit=crop";
pub const DEFAULT_ACTIVITIES: [&str; 2] = ["Sightseeing", "Local Cuisine"];

/// Number of inclusions shown as activities on a card.
const CARD_ACTIVITIES: usize = 4;

// ─── Card ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

/// A tour package flattened for the search results grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
  pub id:             Uuid,
  pub name:           String,
  pub country:        String,
  pub image:          String,
  pub rating:         f64,
  pub review_count:   usize,
  pub min_price:      Option<f64>,
  pub max_price:      Option<f64>,
  pub description:    String,
  pub activities:     Vec<String>,
  pub special_offers: Option<String>,
  pub coordinates:    Coordinates,
  pub duration_days:  Option<u32>,
  pub created_at:     Option<DateTime<Utc>>,
}

impl Destination {
  /// `"$min - $max"`, falling back to the per-person price on either side.
  pub fn price_range(&self) -> String {
    let fmt = |p: Option<f64>| p.map(|p| format!("${p}")).unwrap_or_else(|| "$-".into());
    format!("{} - {}", fmt(self.min_price), fmt(self.max_price))
  }
}

impl From<&TourPackage> for Destination {
  fn from(pkg: &TourPackage) -> Self {
    let dest = pkg.destinations.as_ref();
    let non_empty = |s: &String| !s.is_empty();

    Self {
      id:             pkg.id,
      name:           dest
        .and_then(|d| d.name.clone())
        .filter(non_empty)
        .unwrap_or_else(|| UNKNOWN_DESTINATION.into()),
      country:        dest
        .and_then(|d| d.country.clone())
        .filter(non_empty)
        .unwrap_or_else(|| UNKNOWN_COUNTRY.into()),
      image:          pkg
        .image_url
        .clone()
        .filter(non_empty)
        .or_else(|| dest.and_then(|d| d.image_url.clone()).filter(non_empty))
        .unwrap_or_else(|| DEFAULT_IMAGE.into()),
      rating:         pkg.average_rating(),
      review_count:   pkg.review_count(),
      min_price:      pkg.min_price.or(pkg.price_per_person),
      max_price:      pkg.max_price.or(pkg.price_per_person),
      description:    pkg
        .description
        .clone()
        .filter(non_empty)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.into()),
      activities:     match &pkg.includes {
        Some(includes) => includes.iter().take(CARD_ACTIVITIES).cloned().collect(),
        None => DEFAULT_ACTIVITIES.iter().map(|s| (*s).to_owned()).collect(),
      },
      special_offers: pkg.special_offers.clone(),
      coordinates:    Coordinates {
        lat: dest.and_then(|d| d.latitude).unwrap_or_default(),
        lng: dest.and_then(|d| d.longitude).unwrap_or_default(),
      },
      duration_days:  pkg.duration_days,
      created_at:     pkg.created_at,
    }
  }
}

// ─── Filter vocabulary ───────────────────────────────────────────────────────

/// Kind of trip, inferred from a card's activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
  Beach,
  Mountain,
  City,
}

impl DestinationKind {
  fn keywords(self) -> &'static [&'static str] {
    match self {
      Self::Beach => &["beach", "water", "diving"],
      Self::Mountain => &["hiking", "skiing", "climbing"],
      Self::City => &["cultural", "shopping", "museum"],
    }
  }

  pub fn matches(self, activities: &[String]) -> bool {
    let joined = activities.join(" ").to_lowercase();
    self.keywords().iter().any(|k| joined.contains(k))
  }
}

impl FromStr for DestinationKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "beach" => Ok(Self::Beach),
      "mountain" => Ok(Self::Mountain),
      "city" => Ok(Self::City),
      other => Err(Error::UnknownDestinationKind(other.to_owned())),
    }
  }
}

/// Budget bands applied to a card's minimum price. Bounds are inclusive on
/// both ends, so a boundary price falls in two bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetRange {
  UpTo500,
  From500To1000,
  From1000To2000,
  From2000To5000,
  Over5000,
}

impl BudgetRange {
  pub fn contains(self, price: f64) -> bool {
    match self {
      Self::UpTo500 => price <= 500.0,
      Self::From500To1000 => (500.0..=1000.0).contains(&price),
      Self::From1000To2000 => (1000.0..=2000.0).contains(&price),
      Self::From2000To5000 => (2000.0..=5000.0).contains(&price),
      Self::Over5000 => price >= 5000.0,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::UpTo500 => "0-500",
      Self::From500To1000 => "500-1000",
      Self::From1000To2000 => "1000-2000",
      Self::From2000To5000 => "2000-5000",
      Self::Over5000 => "5000+",
    }
  }
}

impl fmt::Display for BudgetRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for BudgetRange {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "0-500" => Ok(Self::UpTo500),
      "500-1000" => Ok(Self::From500To1000),
      "1000-2000" => Ok(Self::From1000To2000),
      "2000-5000" => Ok(Self::From2000To5000),
      "5000+" => Ok(Self::Over5000),
      other => Err(Error::UnknownBudget(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DestinationSort {
  /// Most reviewed first.
  #[default]
  Popularity,
  PriceLow,
  PriceHigh,
  Rating,
  Newest,
}

impl FromStr for DestinationSort {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "popularity" => Ok(Self::Popularity),
      "price-low" => Ok(Self::PriceLow),
      "price-high" => Ok(Self::PriceHigh),
      "rating" => Ok(Self::Rating),
      "newest" => Ok(Self::Newest),
      other => Err(Error::UnknownSort(other.to_owned())),
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Filters from the search page. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationQuery {
  /// Case-insensitive match over name, country and description.
  pub text:          Option<String>,
  pub kind:          Option<DestinationKind>,
  pub budget:        Option<BudgetRange>,
  /// A card passes if any of its activities contains any of these.
  pub activities:    Vec<String>,
  pub min_rating:    Option<f64>,
  pub duration_days: Option<u32>,
  pub sort:          DestinationSort,
}

impl DestinationQuery {
  pub fn matches(&self, dest: &Destination) -> bool {
    if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
      let needle = text.to_lowercase();
      let hit = [&dest.name, &dest.country, &dest.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }

    if self.kind.is_some_and(|kind| !kind.matches(&dest.activities)) {
      return false;
    }

    // Cards without a price are never excluded by budget.
    if let (Some(budget), Some(price)) = (self.budget, dest.min_price) {
      if !budget.contains(price) {
        return false;
      }
    }

    if !self.activities.is_empty() {
      let wanted: Vec<String> = self.activities.iter().map(|a| a.to_lowercase()).collect();
      let hit = dest.activities.iter().any(|have| {
        let have = have.to_lowercase();
        wanted.iter().any(|w| have.contains(w.as_str()))
      });
      if !hit {
        return false;
      }
    }

    if self.min_rating.is_some_and(|min| dest.rating < min) {
      return false;
    }

    if self.duration_days.is_some_and(|days| dest.duration_days != Some(days)) {
      return false;
    }

    true
  }

  fn compare(&self, a: &Destination, b: &Destination) -> Ordering {
    match self.sort {
      DestinationSort::Popularity => b.review_count.cmp(&a.review_count),
      DestinationSort::PriceLow => price_order(a.min_price, b.min_price, false),
      DestinationSort::PriceHigh => price_order(a.min_price, b.min_price, true),
      DestinationSort::Rating => b.rating.total_cmp(&a.rating),
      DestinationSort::Newest => match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
      },
    }
  }
}

/// Known prices before unknown ones, whichever direction.
fn price_order(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) if descending => b.total_cmp(&a),
    (Some(a), Some(b)) => a.total_cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// Filter then sort. The sort is stable, so ties keep input order.
pub fn search(destinations: &[Destination], query: &DestinationQuery) -> Vec<Destination> {
  let mut hits: Vec<Destination> = destinations
    .iter()
    .filter(|d| query.matches(d))
    .cloned()
    .collect();
  hits.sort_by(|a, b| query.compare(a, b));
  hits
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::package::{DestinationRef, ReviewRef};

  fn package(name: &str, price: f64, includes: &[&str], ratings: &[f64]) -> TourPackage {
    let mut pkg = TourPackage::new(Uuid::new_v4());
    pkg.price_per_person = Some(price);
    pkg.includes = Some(includes.iter().map(|s| (*s).to_owned()).collect());
    pkg.reviews = ratings.iter().map(|&rating| ReviewRef { rating }).collect();
    pkg.destinations = Some(DestinationRef {
      name: Some(name.to_owned()),
      country: Some("Greece".to_owned()),
      ..Default::default()
    });
    pkg
  }

  fn cards() -> Vec<Destination> {
    [
      package("Santorini", 1299.0, &["Beach day", "Wine tasting"], &[5.0, 4.0]),
      package("Meteora", 450.0, &["Hiking", "Monastery visit"], &[4.0]),
      package("Athens", 800.0, &["Cultural walk", "Museum pass"], &[5.0, 5.0, 4.0]),
    ]
    .iter()
    .map(Destination::from)
    .collect()
  }

  fn names(list: &[Destination]) -> Vec<&str> { list.iter().map(|d| d.name.as_str()).collect() }

  #[test]
  fn card_defaults_for_sparse_package() {
    let card = Destination::from(&TourPackage::new(Uuid::nil()));
    assert_eq!(card.name, UNKNOWN_DESTINATION);
    assert_eq!(card.country, UNKNOWN_COUNTRY);
    assert_eq!(card.image, DEFAULT_IMAGE);
    assert_eq!(card.activities, ["Sightseeing", "Local Cuisine"]);
    assert_eq!(card.rating, 0.0);
  }

  #[test]
  fn card_keeps_first_four_inclusions() {
    let pkg = package("Crete", 700.0, &["a", "b", "c", "d", "e"], &[]);
    let card = Destination::from(&pkg);
    assert_eq!(card.activities, ["a", "b", "c", "d"]);
    assert_eq!(card.price_range(), "$700 - $700");
  }

  #[test]
  fn default_sort_is_popularity() {
    let hits = search(&cards(), &DestinationQuery::default());
    assert_eq!(names(&hits), ["Athens", "Santorini", "Meteora"]);
  }

  #[test]
  fn text_search_is_case_insensitive() {
    let query = DestinationQuery {
      text: Some("SANTO".into()),
      ..Default::default()
    };
    assert_eq!(names(&search(&cards(), &query)), ["Santorini"]);
  }

  #[test]
  fn kind_matches_activity_keywords() {
    let query = DestinationQuery {
      kind: Some(DestinationKind::Mountain),
      ..Default::default()
    };
    assert_eq!(names(&search(&cards(), &query)), ["Meteora"]);

    let query = DestinationQuery {
      kind: Some("city".parse().unwrap()),
      ..Default::default()
    };
    assert_eq!(names(&search(&cards(), &query)), ["Athens"]);
  }

  #[test]
  fn budget_uses_minimum_price_and_skips_unpriced() {
    let mut all = cards();
    all.push(Destination::from(&TourPackage::new(Uuid::nil())));

    let query = DestinationQuery {
      budget: Some("500-1000".parse().unwrap()),
      ..Default::default()
    };
    assert_eq!(
      names(&search(&all, &query)),
      ["Athens", UNKNOWN_DESTINATION]
    );
    assert!("cheap".parse::<BudgetRange>().is_err());
  }

  #[test]
  fn activities_rating_and_duration() {
    let mut all = cards();
    all[0].duration_days = Some(7);

    let query = DestinationQuery {
      activities: vec!["wine".into(), "opera".into()],
      ..Default::default()
    };
    assert_eq!(names(&search(&all, &query)), ["Santorini"]);

    let query = DestinationQuery {
      min_rating: Some(4.5),
      ..Default::default()
    };
    assert_eq!(names(&search(&all, &query)), ["Athens", "Santorini"]);

    let query = DestinationQuery {
      duration_days: Some(7),
      ..Default::default()
    };
    assert_eq!(names(&search(&all, &query)), ["Santorini"]);
  }

  #[test]
  fn price_and_rating_sorts() {
    let query = DestinationQuery {
      sort: DestinationSort::PriceLow,
      ..Default::default()
    };
    assert_eq!(names(&search(&cards(), &query)), ["Meteora", "Athens", "Santorini"]);

    let query = DestinationQuery {
      sort: "price-high".parse().unwrap(),
      ..Default::default()
    };
    assert_eq!(names(&search(&cards(), &query)), ["Santorini", "Athens", "Meteora"]);

    let query = DestinationQuery {
      sort: DestinationSort::Rating,
      ..Default::default()
    };
    assert_eq!(names(&search(&cards(), &query)), ["Athens", "Santorini", "Meteora"]);
  }

  #[test]
  fn unpriced_cards_sort_last_both_ways() {
    let mut all = cards();
    all.insert(0, Destination::from(&TourPackage::new(Uuid::nil())));

    for sort in [DestinationSort::PriceLow, DestinationSort::PriceHigh] {
      let query = DestinationQuery {
        sort,
        ..Default::default()
      };
      let hits = search(&all, &query);
      assert_eq!(hits.last().map(|d| d.name.as_str()), Some(UNKNOWN_DESTINATION));
    }
  }

  #[test]
  fn newest_sort_puts_undated_last() {
    let mut all = cards();
    all[1].created_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    all[2].created_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());

    let query = DestinationQuery {
      sort: DestinationSort::Newest,
      ..Default::default()
    };
    assert_eq!(names(&search(&all, &query)), ["Athens", "Meteora", "Santorini"]);
  }
}
