use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::page::context::{Endpoints, PageSettings};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "funnel-tracker",
    version,
    about = "Drive the funnel tracker against a page fixture"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: funnel-tracker.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append tracker decisions to this JSONL file
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Page name reported with CTA notifications
    #[arg(long, global = true)]
    pub page_name: Option<String>,

    /// Redirect target after a successful submission
    #[arg(long, global = true)]
    pub next_page: Option<String>,

    /// Campaign id attached to submitted contacts
    #[arg(long, global = true)]
    pub campaign_id: Option<u64>,

    /// Label (tag) id attached to submitted contacts
    #[arg(long, global = true)]
    pub label_id: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which elements would be used as contact fields
    Identify {
        /// Page fixture (YAML or JSON)
        #[arg(long)]
        page: String,

        /// Restrict the search to one form (default: whole document)
        #[arg(long)]
        form: Option<String>,
    },

    /// Build and validate the contact record without sending it
    Record {
        #[arg(long)]
        page: String,

        #[arg(long)]
        form: Option<String>,
    },

    /// Click an element and run the resulting flow
    Click {
        #[arg(long)]
        page: String,

        /// `id` attribute of the element to click
        #[arg(long, conflicts_with = "index")]
        element: Option<String>,

        /// Position of the element in the fixture
        #[arg(long)]
        index: Option<usize>,
    },

    /// Fire a native submit event on a form
    Submit {
        #[arg(long)]
        page: String,

        /// `id` of the form
        #[arg(long)]
        form: String,
    },

    /// Report a video play event
    Play {
        #[arg(long)]
        page: String,

        /// Hashed media id
        #[arg(long)]
        media: String,

        #[arg(long, default_value_t = 0.0)]
        duration: f64,

        #[arg(long, default_value = "")]
        visitor_key: String,

        #[arg(long, default_value = "")]
        event_key: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `funnel-tracker.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub page: PageSettings,
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("funnel-tracker.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "malformed config, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Settings resolution (CLI > config file > defaults)
// ============================================================================

pub fn resolve_page_settings(cli: &Cli, config: &AppConfig) -> PageSettings {
    PageSettings {
        page_name: cli.page_name.clone().or_else(|| config.page.page_name.clone()),
        next_page: cli.next_page.clone().or_else(|| config.page.next_page.clone()),
        campaign_id: cli.campaign_id.or(config.page.campaign_id),
        label_id: cli.label_id.or(config.page.label_id),
    }
}
