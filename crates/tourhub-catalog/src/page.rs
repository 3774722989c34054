//! 1-based pagination for client-side tables.

use serde::Serialize;

/// Rows per page on the admin dashboard tables.
pub const DEFAULT_PER_PAGE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  /// Current page, 1-based and clamped to `1..=total_pages`.
  pub page:        usize,
  pub per_page:    usize,
  pub total:       usize,
  pub total_pages: usize,
}

impl<T> Page<T> {
  /// 1-based inclusive row range shown on this page; `(0, 0)` when empty.
  pub fn range(&self) -> (usize, usize) {
    if self.items.is_empty() {
      return (0, 0);
    }
    let start = self.page.saturating_sub(1) * self.per_page + 1;
    (start, start + self.items.len() - 1)
  }

  /// `"Showing 6 to 10 of 12 results"`.
  pub fn summary(&self) -> String {
    let (start, end) = self.range();
    format!("Showing {start} to {end} of {} results", self.total)
  }

  pub fn has_previous(&self) -> bool { self.page > 1 }

  pub fn has_next(&self) -> bool { self.page < self.total_pages }
}

/// Slice out page `page` (1-based) of `items`. Out-of-range pages are
/// clamped; a zero `per_page` is treated as one.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
  let per_page = per_page.max(1);
  let total = items.len();
  let total_pages = total.div_ceil(per_page);
  let page = page.clamp(1, total_pages.max(1));
  let start = (page - 1) * per_page;

  Page {
    items: items.iter().skip(start).take(per_page).cloned().collect(),
    page,
    per_page,
    total,
    total_pages,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn middle_and_last_pages() {
    let rows: Vec<u32> = (1..=12).collect();

    let page = paginate(&rows, 2, DEFAULT_PER_PAGE);
    assert_eq!(page.items, [6, 7, 8, 9, 10]);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.summary(), "Showing 6 to 10 of 12 results");
    assert!(page.has_previous() && page.has_next());

    let page = paginate(&rows, 3, DEFAULT_PER_PAGE);
    assert_eq!(page.items, [11, 12]);
    assert_eq!(page.range(), (11, 12));
    assert!(!page.has_next());
  }

  #[test]
  fn out_of_range_pages_clamp() {
    let rows: Vec<u32> = (1..=3).collect();
    assert_eq!(paginate(&rows, 0, 5).page, 1);
    assert_eq!(paginate(&rows, 9, 2).page, 2);
  }

  #[test]
  fn empty_table() {
    let page = paginate::<u32>(&[], 1, 5);
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.summary(), "Showing 0 to 0 of 0 results");
  }

  #[test]
  fn hand_built_page_zero_reads_as_first() {
    let page = Page {
      items:       vec![1, 2],
      page:        0,
      per_page:    5,
      total:       2,
      total_pages: 1,
    };
    assert_eq!(page.range(), (1, 2));
    assert!(!page.has_previous());
  }
}
