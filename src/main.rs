use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use palisade::config::Config;
use palisade::db::models::Fingerprint;
use palisade::db::{self, SqliteStore, Store};
use palisade::moderation::categories::ProviderRegistry;
use palisade::moderation::gate::{GateOptions, ModerationGate, Screening};
use palisade::moderation::perspective::PerspectiveClassifier;
use palisade::moderation::reports::ReportDesk;
use palisade::moderation::settings::StoreSettings;
use palisade::trust::TrustEngine;

/// Palisade: contextual login trust and content moderation.
///
/// Classifies signin device fingerprints against a user's trusted
/// contexts, escalates suspicious logins, and screens submitted content
/// for toxicity before it is persisted.
#[derive(Parser)]
#[command(name = "palisade", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FingerprintArgs {
    #[arg(long, default_value = "127.0.0.1")]
    ip: String,
    #[arg(long, default_value = "")]
    country: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long)]
    browser: String,
    #[arg(long)]
    platform: String,
    #[arg(long)]
    os: String,
    #[arg(long)]
    device: String,
    #[arg(long, default_value = "Desktop")]
    device_type: String,
}

impl FingerprintArgs {
    fn into_fingerprint(self) -> Fingerprint {
        Fingerprint {
            ip: self.ip,
            country: self.country,
            city: self.city,
            browser: self.browser,
            platform: self.platform,
            os: self.os,
            device: self.device,
            device_type: self.device_type,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Classify a signin attempt's fingerprint
    Signin {
        /// The user signing in
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: String,
        #[command(flatten)]
        fingerprint: FingerprintArgs,
    },

    /// Show a user's context data (primary, trusted, blocked)
    Contexts {
        #[arg(long)]
        user: String,
    },

    /// Block a suspicious login by id
    Block { id: i64 },

    /// Unblock a suspicious login by id
    Unblock { id: i64 },

    /// Promote a suspicious login to a trusted context
    Trust { id: i64 },

    /// Delete a context-data record by id
    DeleteContext { id: i64 },

    /// Screen content through the moderation gate
    Screen {
        /// The content to screen
        content: String,
    },

    /// Tag content with category scores via the configured provider
    Categorize {
        /// The content to categorize
        content: String,
    },

    /// Show the current moderation preferences
    Preferences,

    /// Update the moderation preferences
    SetPreferences {
        /// Enable or disable toxicity screening
        #[arg(long)]
        use_perspective_api: Option<bool>,

        /// Category-filter provider (TextRazor, InterfaceAPI, ClassifierAPI)
        #[arg(long)]
        provider: Option<String>,

        /// Provider request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Report a post
    Report {
        #[arg(long)]
        post: String,
        #[arg(long)]
        community: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        reason: String,
    },

    /// List reported posts in a community
    ReportedPosts {
        #[arg(long)]
        community: String,
    },

    /// Remove a reported post (drops all reports referencing it)
    RemovePost { post: String },

    /// Dismiss a single report by id
    DismissReport { id: i64 },

    /// Show system status (DB stats, preferences)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("palisade=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let config = Config::load()?;
            let conn = db::initialize(&config.db_path)?;
            let tables = palisade::db::schema::table_count(&conn)?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {tables}");
            println!("\nPalisade is ready. Next step: set up your .env file");
            println!("  (see .env.example for provider credentials)");
        }

        Commands::Signin {
            user,
            email,
            fingerprint,
        } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let engine = TrustEngine::new(store);

            let fp = fingerprint.into_fingerprint();
            let result = engine.classify(&user, &email, &fp).await?;

            use palisade::trust::Classification::*;
            match result {
                NoContextData => {
                    println!("{}", "no_context_data".green());
                    println!("First login — fingerprint stored as the trusted context.");
                }
                Match => {
                    println!("{}", "match".green());
                    println!("Fingerprint matches a known context. Login proceeds.");
                }
                Unverified { attempts } => {
                    println!("{}", "unverified".yellow());
                    println!(
                        "Unrecognized device (attempt {attempts}). Login proceeds with a notice."
                    );
                }
                Blocked => {
                    println!("{}", "blocked".red().bold());
                    println!("This device has been blocked. Login refused.");
                }
            }
        }

        Commands::Contexts { user } => {
            let config = Config::load()?;
            let store = open_store(&config)?;

            match store.primary_context(&user).await? {
                Some(primary) => {
                    println!("{}", "Primary context:".bold());
                    print_fingerprint(&primary.fingerprint, primary.id, primary.is_trusted);
                }
                None => println!("No context data for user {user}."),
            }

            let trusted = store.trusted_contexts(&user).await?;
            println!("\n{} ({})", "Trusted contexts:".bold(), trusted.len());
            for context in &trusted {
                print_fingerprint(&context.fingerprint, context.id, context.is_trusted);
            }

            let blocked = store.blocked_logins(&user).await?;
            println!("\n{} ({})", "Blocked devices:".bold(), blocked.len());
            for login in &blocked {
                println!(
                    "  [{}] {} / {} / {} ({} attempts)",
                    login.id,
                    login.fingerprint.browser,
                    login.fingerprint.os,
                    login.fingerprint.device,
                    login.unverified_attempts
                );
            }
        }

        Commands::Block { id } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            TrustEngine::new(store).block(id).await?;
            println!("Blocked successfully");
        }

        Commands::Unblock { id } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            TrustEngine::new(store).unblock(id).await?;
            println!("Unblocked successfully");
        }

        Commands::Trust { id } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let context_id = TrustEngine::new(store).promote(id).await?;
            println!("Promoted to trusted context {context_id}");
        }

        Commands::DeleteContext { id } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            if store.delete_context(id).await? {
                println!("Data deleted successfully");
            } else {
                println!("{}", format!("No context data with id {id}").yellow());
            }
        }

        Commands::Screen { content } => {
            let config = Config::load()?;
            let store = open_store(&config)?;

            // Only demand the API key when screening is actually on
            if store.get_moderation_config().await?.use_perspective_api {
                config.require_perspective()?;
            }

            let gate = build_gate(&config, store);
            match gate.screen(&content).await? {
                Screening::Accept => println!("{}", "accept".green()),
                Screening::Reject { reason } => {
                    println!("{}", "reject".red().bold());
                    println!("type: {}", reason.as_str());
                }
            }
        }

        Commands::Categorize { content } => {
            let config = Config::load()?;
            let store = open_store(&config)?;

            let provider_id = store.get_moderation_config().await?.category_provider;
            config.require_category_provider(&provider_id)?;

            let gate = build_gate(&config, store);
            let categories = gate.categorize(&content).await?;

            if categories.is_empty() {
                println!("No categories returned.");
            } else {
                let mut sorted: Vec<_> = categories.into_iter().collect();
                sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
                for (category, score) in sorted {
                    println!("  {score:>5.2}  {category}");
                }
            }
        }

        Commands::Preferences => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let prefs = store.get_moderation_config().await?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }

        Commands::SetPreferences {
            use_perspective_api,
            provider,
            timeout_ms,
        } => {
            let config = Config::load()?;
            let store = open_store(&config)?;

            let mut prefs = store.get_moderation_config().await?;
            if let Some(enabled) = use_perspective_api {
                prefs.use_perspective_api = enabled;
            }
            if let Some(provider) = provider {
                prefs.category_provider = provider;
            }
            if let Some(timeout) = timeout_ms {
                prefs.request_timeout_ms = timeout;
            }
            store.save_moderation_config(&prefs).await?;

            println!("{}", "Preferences updated.".bold());
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }

        Commands::Report {
            post,
            community,
            user,
            reason,
        } => {
            let config = Config::load()?;
            let store = open_store(&config)?;

            let desk = ReportDesk::new(store);
            match desk.report_post(&post, &community, &user, &reason).await {
                Ok(_) => println!("Post reported successfully."),
                Err(e @ palisade::error::Error::AlreadyReported) => {
                    println!("{}", e.to_string().yellow());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::ReportedPosts { community } => {
            let config = Config::load()?;
            let store = open_store(&config)?;

            let reports = ReportDesk::new(store).reported_posts(&community).await?;
            if reports.is_empty() {
                println!("No reported posts in {community}.");
            } else {
                for report in &reports {
                    println!(
                        "  [{}] post {} — {} ({} reporters)",
                        report.id,
                        report.post_id,
                        report.report_reason,
                        report.reported_by.len()
                    );
                }
            }
        }

        Commands::RemovePost { post } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            let removed = ReportDesk::new(store).remove_post(&post).await?;
            if removed > 0 {
                println!("Reported post removed successfully");
            } else {
                println!("{}", format!("No reports reference post {post}").yellow());
            }
        }

        Commands::DismissReport { id } => {
            let config = Config::load()?;
            let store = open_store(&config)?;
            match ReportDesk::new(store).dismiss(id).await {
                Ok(()) => println!("Report dismissed."),
                Err(palisade::error::Error::NotFound { .. }) => {
                    println!("{}", format!("No report with id {id}").yellow());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            let conn = db::open(&config.db_path)?;
            palisade::status::show(&conn, &config.db_path)?;
        }
    }

    Ok(())
}

/// Open the database and wrap it in the async store.
fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    let conn = db::initialize(&config.db_path)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

/// Assemble the moderation gate from configuration.
fn build_gate(config: &Config, store: Arc<dyn Store>) -> ModerationGate {
    ModerationGate::new(
        Arc::new(StoreSettings::new(store)),
        Arc::new(PerspectiveClassifier::new(
            config.perspective_api_key.clone(),
        )),
        ProviderRegistry::from_config(config),
        GateOptions {
            toxicity_threshold: config.toxicity_threshold,
            fail_policy: config.fail_policy,
        },
    )
}

fn print_fingerprint(fp: &Fingerprint, id: i64, trusted: bool) {
    let trust_marker = if trusted {
        "trusted".green().to_string()
    } else {
        "untrusted".dimmed().to_string()
    };
    println!(
        "  [{}] {} / {} / {} / {} ({}, {}) — {}",
        id, fp.browser, fp.platform, fp.os, fp.device, fp.ip, fp.country, trust_marker
    );
}
