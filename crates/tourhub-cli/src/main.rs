//! `tourhub`: command-line client for a TourHub deployment.
//!
//! Reads `tourhub.toml` (or the path given with `--config`) plus
//! `TOURHUB_*` environment variables, restores the saved session and runs one
//! account or catalogue command.
//!
//! ```text
//! TOURHUB_SUPABASE_URL=https://abcd.supabase.co \
//! TOURHUB_SUPABASE_ANON_KEY=... \
//!   tourhub sign-in --email admin@tourismhub.com --remember
//! ```

mod commands;
mod remember;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tourhub_catalog::{
  booking::{BookingColumn, BookingStatus},
  content::{ContentColumn, ContentStatus},
  destination::{BudgetRange, DestinationKind, DestinationSort},
  page::DEFAULT_PER_PAGE,
};
use tourhub_core::role::Role;
use tourhub_session::{SessionConfig, SessionStore};
use tourhub_supabase::{SupabaseClient, SupabaseConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tourhub", version, about = "TourHub account and catalogue client")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tourhub.toml")]
  config: PathBuf,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Sign in with email and password (password read from stdin).
  SignIn {
    /// Defaults to the remembered email, if any.
    #[arg(long)]
    email:    Option<String>,
    /// Remember the email for the next sign-in.
    #[arg(long)]
    remember: bool,
  },
  /// Create an account (password read from stdin).
  SignUp {
    #[arg(long)]
    email:     String,
    #[arg(long)]
    full_name: String,
    #[arg(long, default_value = "tourist")]
    role:      Role,
  },
  SignOut,
  /// Show the signed-in user.
  Whoami,
  /// Email a password-reset link.
  ForgotPassword { email: String },
  /// Set a new password (read from stdin).
  UpdatePassword,
  /// Start an email change.
  UpdateEmail { email: String },
  /// Show or edit the signed-in user's profile.
  Profile {
    #[arg(long)]
    full_name:     Option<String>,
    #[arg(long)]
    phone:         Option<String>,
    #[arg(long)]
    nationality:   Option<String>,
    /// `YYYY-MM-DD`.
    #[arg(long)]
    date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    profile_image: Option<String>,
  },
  /// Search destinations.
  Destinations {
    #[arg(long)]
    search:     Option<String>,
    /// `beach`, `mountain` or `city`.
    #[arg(long)]
    kind:       Option<DestinationKind>,
    /// `0-500`, `500-1000`, `1000-2000`, `2000-5000` or `5000+`.
    #[arg(long)]
    budget:     Option<BudgetRange>,
    /// Repeatable.
    #[arg(long = "activity")]
    activities: Vec<String>,
    #[arg(long)]
    min_rating: Option<f64>,
    /// Exact trip length in days.
    #[arg(long)]
    duration:   Option<u32>,
    /// `popularity`, `price-low`, `price-high`, `rating` or `newest`.
    #[arg(long, default_value = "popularity")]
    sort:       DestinationSort,
    #[arg(long, default_value_t = 1)]
    page:       usize,
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page:   usize,
  },
  /// List bookings with status counts and revenue.
  Bookings {
    /// Only list bookings in this state; counts still cover every booking.
    #[arg(long)]
    status:   Option<BookingStatus>,
    /// Every booking rather than your own (admins only).
    #[arg(long)]
    all:      bool,
    /// `created`, `departure`, `amount` or `status`. Repeating a column
    /// flips its direction, like clicking a table header twice.
    #[arg(long = "sort")]
    sort:     Vec<BookingColumn>,
    #[arg(long, default_value_t = 1)]
    page:     usize,
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: usize,
  },
  /// Book a tour package.
  Book {
    #[arg(long)]
    package:   Uuid,
    /// `YYYY-MM-DD`.
    #[arg(long)]
    departure: NaiveDate,
    #[arg(long, default_value_t = 1)]
    travelers: u32,
    /// Total price for the whole party.
    #[arg(long)]
    amount:    f64,
  },
  /// Filter an exported content list (admins only).
  Content {
    /// JSON array of content items.
    file:     PathBuf,
    #[arg(long = "type")]
    kind:     Option<String>,
    #[arg(long)]
    status:   Option<ContentStatus>,
    #[arg(long)]
    author:   Option<String>,
    #[arg(long)]
    search:   Option<String>,
    /// Modified on or after this day (`YYYY-MM-DD`).
    #[arg(long)]
    since:    Option<NaiveDate>,
    /// `title`, `type`, `author` or `modified`; repeat to flip direction.
    #[arg(long = "sort")]
    sort:     Vec<ContentColumn>,
    #[arg(long, default_value_t = 1)]
    page:     usize,
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: usize,
  },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from the config file and environment.
#[derive(Deserialize)]
struct AppConfig {
  supabase_url:      String,
  supabase_anon_key: String,
  /// Public origin used in emailed links.
  #[serde(default)]
  site_url:          String,
  /// Holds the saved session and the remembered email.
  #[serde(default = "default_state_dir")]
  state_dir:         PathBuf,
  #[serde(default = "default_timeout_secs")]
  timeout_secs:      u64,
}

fn default_state_dir() -> PathBuf { PathBuf::from("~/.local/state/tourhub") }

fn default_timeout_secs() -> u64 { 30 }

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays clean for results.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TOURHUB"))
    .build()
    .context("failed to read config file")?;

  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise AppConfig")?;

  let state_dir = expand_tilde(&app_cfg.state_dir);

  let client = SupabaseClient::new(SupabaseConfig {
    url:          app_cfg.supabase_url,
    anon_key:     app_cfg.supabase_anon_key,
    session_file: Some(state_dir.join("session.json")),
    timeout_secs: app_cfg.timeout_secs,
  })
  .context("failed to build HTTP client")?;

  let store = SessionStore::new(Arc::new(client), SessionConfig::new(app_cfg.site_url));
  store.mount();
  store.ready().await;

  let ctx = commands::Context {
    store,
    remembered: remember::RememberedEmail::new(state_dir.join("remembered_email")),
    json: cli.json,
  };
  commands::run(&ctx, cli.command).await
}

/// Read a secret from stdin after printing `prompt` to stderr.
fn read_secret(prompt: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("{prompt}: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin
    .lock()
    .read_line(&mut line)
    .context("failed to read from stdin")?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
