//! Content-management table: filters and status counts.

use std::{cmp::Ordering, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
  Published,
  Draft,
  Pending,
  Archived,
}

impl ContentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Published => "published",
      Self::Draft => "draft",
      Self::Pending => "pending",
      Self::Archived => "archived",
    }
  }
}

impl FromStr for ContentStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "published" => Ok(Self::Published),
      "draft" => Ok(Self::Draft),
      "pending" => Ok(Self::Pending),
      "archived" => Ok(Self::Archived),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

/// A managed piece of site content (destination page, tour write-up, blog
/// post and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
  pub id:            u64,
  pub title:         String,
  #[serde(default)]
  pub description:   String,
  #[serde(rename = "type")]
  pub content_type:  String,
  pub status:        ContentStatus,
  pub author:        String,
  #[serde(default)]
  pub tags:          Vec<String>,
  pub last_modified: DateTime<Utc>,
}

/// Table filters. `None` is the "all" option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilter {
  pub content_type:   Option<String>,
  pub status:         Option<ContentStatus>,
  /// Case-insensitive substring of the author name.
  pub author:         Option<String>,
  /// Case-insensitive match over title, description and tags.
  pub search:         Option<String>,
  pub modified_since: Option<DateTime<Utc>>,
}

impl ContentFilter {
  pub fn matches(&self, item: &ContentItem) -> bool {
    if self
      .content_type
      .as_ref()
      .is_some_and(|t| *t != item.content_type)
    {
      return false;
    }
    if self.status.is_some_and(|s| s != item.status) {
      return false;
    }
    if let Some(author) = &self.author {
      if !item.author.to_lowercase().contains(&author.to_lowercase()) {
        return false;
      }
    }
    if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
      let needle = search.to_lowercase();
      let hit = item.title.to_lowercase().contains(&needle)
        || item.description.to_lowercase().contains(&needle)
        || item.tags.iter().any(|t| t.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }
    if self.modified_since.is_some_and(|since| item.last_modified < since) {
      return false;
    }
    true
  }

  pub fn apply<'a>(&self, items: &'a [ContentItem]) -> Vec<&'a ContentItem> {
    items.iter().filter(|i| self.matches(i)).collect()
  }
}

/// Sortable columns of the content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentColumn {
  Title,
  Type,
  Author,
  Modified,
}

impl ContentColumn {
  /// Ascending order for this column. Text compares case-insensitively.
  pub fn compare(&self, a: &ContentItem, b: &ContentItem) -> Ordering {
    let text = |x: &str, y: &str| x.to_lowercase().cmp(&y.to_lowercase());
    match self {
      Self::Title => text(&a.title, &b.title),
      Self::Type => text(&a.content_type, &b.content_type),
      Self::Author => text(&a.author, &b.author),
      Self::Modified => a.last_modified.cmp(&b.last_modified),
    }
  }
}

impl FromStr for ContentColumn {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "title" => Ok(Self::Title),
      "type" => Ok(Self::Type),
      "author" => Ok(Self::Author),
      "modified" => Ok(Self::Modified),
      other => Err(Error::UnknownSort(other.to_owned())),
    }
  }
}

/// Header counters above the content table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
  pub total:     usize,
  pub published: usize,
  pub draft:     usize,
  pub pending:   usize,
  pub archived:  usize,
}

impl StatusCounts {
  pub fn of(items: &[ContentItem]) -> Self {
    items.iter().fold(
      Self {
        total: items.len(),
        ..Default::default()
      },
      |mut counts, item| {
        match item.status {
          ContentStatus::Published => counts.published += 1,
          ContentStatus::Draft => counts.draft += 1,
          ContentStatus::Pending => counts.pending += 1,
          ContentStatus::Archived => counts.archived += 1,
        }
        counts
      },
    )
  }
}
