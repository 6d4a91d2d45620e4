use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::selector::context::MAX_ACTION_COUNT;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "droid-probe",
    version,
    about = "UI-state canonicalization and selector resolution for Android UI testing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: droid-probe.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Describe a recorded observation: fingerprints and pruned element tree
    Describe {
        /// Path to an observation JSON file
        #[arg(long)]
        state: String,
    },

    /// Enumerate the possible input events of a recorded observation
    Actions {
        /// Path to an observation JSON file
        #[arg(long)]
        state: String,
    },

    /// Run a selector script against a directory of recorded observation frames
    Run {
        /// Path to the authored script
        #[arg(long)]
        script: String,

        /// Path to the element name catalog (YAML or JSON)
        #[arg(long)]
        catalog: String,

        /// Directory of observation frames consumed in filename order
        #[arg(long)]
        frames: String,

        /// Path for the execution trace log (JSONL)
        #[arg(long)]
        trace: Option<String>,

        /// Action budget for this execution
        #[arg(long)]
        max_actions: Option<u32>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `droid-probe.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_max_actions")]
    pub max_actions: u32,

    pub trace: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_actions: MAX_ACTION_COUNT,
            trace: None,
        }
    }
}

fn default_max_actions() -> u32 {
    MAX_ACTION_COUNT
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("droid-probe.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
