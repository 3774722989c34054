//! Subcommand handlers.

use std::path::Path;

use anyhow::{Context as _, bail};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use serde_json::json;
use tourhub_catalog::{
  booking::{self, Booking, BookingColumn, BookingStats, BookingStatus, NewBooking},
  content::{ContentColumn, ContentFilter, ContentItem, StatusCounts},
  destination::{self, Destination, DestinationQuery},
  page::paginate,
  sort::SortState,
};
use tourhub_core::{Outcome, profile::ProfileChanges};
use tourhub_session::{Access, AuthState, Gate, SessionStore, gate};
use uuid::Uuid;
use tourhub_supabase::SupabaseClient;
use tracing::info;

use crate::{Command, read_secret, remember::RememberedEmail};

pub struct Context {
  pub store:      SessionStore<SupabaseClient>,
  pub remembered: RememberedEmail,
  pub json:       bool,
}

impl Context {
  fn print_json(&self, value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
  }

  /// Print a successful outcome's message, or turn a failed one into an
  /// error carrying its user-facing text.
  fn report<T: Serialize>(&self, outcome: Outcome<T>) -> anyhow::Result<Option<T>> {
    if !outcome.success {
      bail!(
        outcome
          .error
          .unwrap_or_else(|| "Operation failed".to_owned())
      );
    }
    if self.json {
      self.print_json(&outcome)?;
    } else if let Some(message) = &outcome.message {
      println!("{message}");
    }
    Ok(outcome.data)
  }

  /// Wait for the session to settle and check it against `required`.
  async fn require(&self, required: Gate) -> anyhow::Result<AuthState> {
    let state = self.store.settled().await;
    match gate::evaluate(required, &state) {
      Access::Granted => Ok(state),
      Access::RedirectToLogin => bail!("No user logged in"),
      Access::Forbidden => bail!("This command is for administrators only"),
      Access::Pending => bail!("Session is still loading; try again"),
    }
  }
}

/// Apply repeated `--sort` flags the way repeated header clicks would.
fn sort_state<F: PartialEq + Copy>(clicks: &[F]) -> SortState<F> {
  let mut state = SortState::default();
  for &column in clicks {
    state.toggle(column);
  }
  state
}

pub async fn run(ctx: &Context, command: Command) -> anyhow::Result<()> {
  match command {
    Command::SignIn { email, remember } => sign_in(ctx, email, remember).await,
    Command::SignUp {
      email,
      full_name,
      role,
    } => {
      let password = read_secret("Password")?;
      let outcome = ctx.store.sign_up(&email, &password, &full_name, role).await;
      ctx.report(outcome)?;
      Ok(())
    }
    Command::SignOut => {
      let outcome = ctx.store.sign_out().await;
      ctx.report(outcome)?;
      if !ctx.json {
        println!("Signed out");
      }
      Ok(())
    }
    Command::Whoami => whoami(ctx).await,
    Command::ForgotPassword { email } => {
      let outcome = ctx.store.request_password_reset(&email).await;
      ctx.report(outcome)?;
      Ok(())
    }
    Command::UpdatePassword => {
      let password = read_secret("New password")?;
      let outcome = ctx.store.update_password(&password).await;
      ctx.report(outcome)?;
      Ok(())
    }
    Command::UpdateEmail { email } => {
      let outcome = ctx.store.update_email(&email).await;
      ctx.report(outcome)?;
      Ok(())
    }
    Command::Profile {
      full_name,
      phone,
      nationality,
      date_of_birth,
      profile_image,
    } => {
      let changes = ProfileChanges {
        full_name,
        phone,
        nationality,
        date_of_birth,
        profile_image,
        updated_at: None,
      };
      profile(ctx, changes).await
    }
    Command::Destinations {
      search,
      kind,
      budget,
      activities,
      min_rating,
      duration,
      sort,
      page,
      per_page,
    } => {
      let query = DestinationQuery {
        text: search,
        kind,
        budget,
        activities,
        min_rating,
        duration_days: duration,
        sort,
      };
      destinations(ctx, &query, page, per_page).await
    }
    Command::Bookings {
      status,
      all,
      sort,
      page,
      per_page,
    } => bookings(ctx, status, all, &sort, page, per_page).await,
    Command::Book {
      package,
      departure,
      travelers,
      amount,
    } => book(ctx, package, departure, travelers, amount).await,
    Command::Content {
      file,
      kind,
      status,
      author,
      search,
      since,
      sort,
      page,
      per_page,
    } => {
      let filter = ContentFilter {
        content_type: kind,
        status,
        author,
        search,
        modified_since: since.map(|day| day.and_time(NaiveTime::MIN).and_utc()),
      };
      content(ctx, &file, &filter, &sort, page, per_page).await
    }
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

async fn sign_in(ctx: &Context, email: Option<String>, remember: bool) -> anyhow::Result<()> {
  let email = match email {
    Some(email) => email,
    None => ctx
      .remembered
      .load()
      .await
      .context("failed to read remembered email")?
      .context("no email given and none remembered; pass --email")?,
  };
  let password = read_secret("Password")?;

  let outcome = ctx.store.sign_in(&email, &password).await;
  ctx.report(outcome)?;

  let hint = if remember {
    ctx.remembered.save(&email).await
  } else {
    ctx.remembered.clear().await
  };
  hint.context("failed to update remembered email")?;

  let state = ctx.store.settled().await;
  info!(email = %email, role = %state.effective_role(), "signed in");
  if !ctx.json {
    println!("Signed in as {} ({})", state.display_name(), state.effective_role());
  }
  Ok(())
}

async fn whoami(ctx: &Context) -> anyhow::Result<()> {
  let state = ctx.store.settled().await;
  if ctx.json {
    return ctx.print_json(&state);
  }

  let AuthState::Authenticated { identity, .. } = &state else {
    println!("Not signed in");
    return Ok(());
  };
  println!("{} [{}]", state.display_name(), state.initials());
  println!("  email:    {}", identity.email.as_deref().unwrap_or("-"));
  println!("  role:     {}", state.effective_role());
  println!("  verified: {}", if state.is_verified() { "yes" } else { "no" });
  if let Some(profile) = state.profile() {
    println!("  phone:    {}", profile.phone.as_deref().unwrap_or("-"));
    println!("  country:  {}", profile.nationality.as_deref().unwrap_or("-"));
  }
  Ok(())
}

/// Show the profile when no field is given, otherwise apply the changes.
async fn profile(ctx: &Context, changes: ProfileChanges) -> anyhow::Result<()> {
  if changes == ProfileChanges::default() {
    let state = ctx.require(Gate::Authenticated).await?;
    let profile = state.profile().context("no profile on record")?;
    return if ctx.json {
      ctx.print_json(profile)
    } else {
      println!("{}", serde_json::to_string_pretty(profile)?);
      Ok(())
    };
  }

  let outcome = ctx.store.update_profile(&changes).await;
  if let Some(profile) = ctx.report(outcome)?
    && !ctx.json
  {
    println!(
      "Profile updated for {}",
      profile.full_name.as_deref().unwrap_or("you")
    );
  }
  Ok(())
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

async fn destinations(
  ctx: &Context,
  query: &DestinationQuery,
  page: usize,
  per_page: usize,
) -> anyhow::Result<()> {
  let packages = ctx
    .store
    .backend()
    .list_tour_packages()
    .await
    .context("failed to load tour packages")?;
  let cards: Vec<Destination> = packages.iter().map(Destination::from).collect();
  let hits = destination::search(&cards, query);
  let page = paginate(&hits, page, per_page);

  if ctx.json {
    return ctx.print_json(&page);
  }
  for dest in &page.items {
    println!(
      "{:<28} {:<16} {:>17}  {:.1} ({} reviews)",
      dest.name,
      dest.country,
      dest.price_range(),
      dest.rating,
      dest.review_count,
    );
  }
  println!("{}", page.summary());
  Ok(())
}

// ─── Bookings ────────────────────────────────────────────────────────────────

async fn bookings(
  ctx: &Context,
  status: Option<BookingStatus>,
  all: bool,
  clicks: &[BookingColumn],
  page: usize,
  per_page: usize,
) -> anyhow::Result<()> {
  let state = if all {
    ctx.require(Gate::Admin).await?
  } else {
    ctx.require(Gate::Authenticated).await?
  };
  let owner = match (&state, all) {
    (AuthState::Authenticated { identity, .. }, false) => Some(identity.id),
    _ => None,
  };

  let rows = ctx
    .store
    .backend()
    .list_bookings(owner, None)
    .await
    .context("failed to load bookings")?;
  let stats = BookingStats::of(&rows);

  let mut listed: Vec<Booking> = booking::with_status(&rows, status)
    .into_iter()
    .cloned()
    .collect();
  sort_state(clicks).sort(&mut listed, BookingColumn::compare);
  let page = paginate(&listed, page, per_page);

  if ctx.json {
    return ctx.print_json(&json!({ "stats": stats, "page": page }));
  }
  println!(
    "{} bookings: {} pending, {} confirmed, {} cancelled, {} completed; revenue {:.2}",
    stats.total,
    stats.pending,
    stats.confirmed,
    stats.cancelled,
    stats.completed,
    stats.revenue,
  );
  for row in &page.items {
    println!(
      "{:<16} {:<28} {:>10} {:>3} {:<9} {:>10.2}",
      row.booking_reference.as_deref().unwrap_or("-"),
      row.package_title(),
      row
        .departure_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_owned()),
      row.travelers.unwrap_or(1),
      row.status.as_str(),
      row.total_amount,
    );
  }
  println!("{}", page.summary());
  Ok(())
}

async fn book(
  ctx: &Context,
  package: Uuid,
  departure: NaiveDate,
  travelers: u32,
  amount: f64,
) -> anyhow::Result<()> {
  let state = ctx.require(Gate::Authenticated).await?;
  let user_id = state.identity().context("No user logged in")?.id;
  if travelers == 0 {
    bail!("At least one traveller is required");
  }

  let booking = NewBooking {
    user_id,
    tour_package_id: package,
    departure_date: departure,
    travelers,
    total_amount: amount,
  };
  let stored = ctx
    .store
    .backend()
    .create_booking(&booking)
    .await
    .context("failed to create booking")?;
  info!(reference = ?stored.booking_reference, "booking created");

  if ctx.json {
    return ctx.print_json(&stored);
  }
  println!(
    "Booked {} for {} on {departure}: reference {} ({})",
    stored.package_title(),
    stored.travelers.unwrap_or(travelers),
    stored.booking_reference.as_deref().unwrap_or("-"),
    stored.status.as_str(),
  );
  Ok(())
}

// ─── Content ─────────────────────────────────────────────────────────────────

async fn content(
  ctx: &Context,
  file: &Path,
  filter: &ContentFilter,
  clicks: &[ContentColumn],
  page: usize,
  per_page: usize,
) -> anyhow::Result<()> {
  ctx.require(Gate::Admin).await?;

  let raw = tokio::fs::read(file)
    .await
    .with_context(|| format!("failed to read {}", file.display()))?;
  let items: Vec<ContentItem> = serde_json::from_slice(&raw)
    .with_context(|| format!("{} is not a content list", file.display()))?;
  let counts = StatusCounts::of(&items);

  let mut hits: Vec<ContentItem> = filter.apply(&items).into_iter().cloned().collect();
  sort_state(clicks).sort(&mut hits, ContentColumn::compare);
  let page = paginate(&hits, page, per_page);

  if ctx.json {
    return ctx.print_json(&json!({ "counts": counts, "page": page }));
  }
  println!(
    "{} items: {} published, {} draft, {} pending, {} archived",
    counts.total, counts.published, counts.draft, counts.pending, counts.archived,
  );
  for item in &page.items {
    println!(
      "{:<32} {:<12} {:<10} {:<18} {}",
      item.title,
      item.content_type,
      item.status.as_str(),
      item.author,
      item.last_modified.format("%Y-%m-%d"),
    );
  }
  println!("{}", page.summary());
  Ok(())
}
