//! Click-to-sort column state for tables.

use std::cmp::Ordering;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  pub fn flipped(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }

  /// Apply this direction to an ascending comparison.
  pub fn apply(self, ordering: Ordering) -> Ordering {
    match self {
      Self::Asc => ordering,
      Self::Desc => ordering.reverse(),
    }
  }
}

/// Which column a table is sorted by. `F` is the table's column key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
  pub field:     Option<F>,
  pub direction: SortDirection,
}

impl<F> Default for SortState<F> {
  fn default() -> Self {
    Self {
      field:     None,
      direction: SortDirection::Asc,
    }
  }
}

impl<F: PartialEq> SortState<F> {
  /// Clicking the current column flips direction; clicking another column
  /// sorts by it ascending.
  pub fn toggle(&mut self, field: F) {
    if self.field.as_ref() == Some(&field) {
      self.direction = self.direction.flipped();
    } else {
      self.field = Some(field);
      self.direction = SortDirection::Asc;
    }
  }

  /// Sort `rows` in place with `compare` giving the ascending order for a
  /// column. Unsorted tables keep their order.
  pub fn sort<T>(&self, rows: &mut [T], compare: impl Fn(&F, &T, &T) -> Ordering) {
    if let Some(field) = &self.field {
      rows.sort_by(|a, b| self.direction.apply(compare(field, a, b)));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  enum Column {
    Name,
    Bookings,
  }

  #[test]
  fn toggle_flips_then_resets() {
    let mut state = SortState::default();
    state.toggle(Column::Name);
    assert_eq!(state.direction, SortDirection::Asc);
    state.toggle(Column::Name);
    assert_eq!(state.direction, SortDirection::Desc);
    state.toggle(Column::Bookings);
    assert_eq!(state.field, Some(Column::Bookings));
    assert_eq!(state.direction, SortDirection::Asc);
  }

  type Row = (&'static str, u32);

  fn compare(col: &Column, a: &Row, b: &Row) -> Ordering {
    match col {
      Column::Name => a.0.cmp(b.0),
      Column::Bookings => a.1.cmp(&b.1),
    }
  }

  #[test]
  fn sorts_by_selected_column() {
    let mut rows: Vec<Row> = vec![("Bali", 3), ("Alps", 9), ("Crete", 5)];

    SortState::default().sort(&mut rows, compare);
    assert_eq!(rows[0].0, "Bali");

    let mut state = SortState::default();
    state.toggle(Column::Bookings);
    state.toggle(Column::Bookings);
    state.sort(&mut rows, compare);
    assert_eq!(rows, [("Alps", 9), ("Crete", 5), ("Bali", 3)]);
  }
}
