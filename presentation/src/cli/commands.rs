//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for selfcheck
#[derive(Parser, Debug)]
#[command(name = "selfcheck")]
#[command(author, version, about = "Self-assessment surveys - answer, score and track check-ins")]
#[command(long_about = r#"
selfcheck runs short self-assessment surveys in the terminal.

A survey blueprint groups scale prompts into categories. Taking a survey
records one answer per prompt; the results show the average per category
and overall. Completed runs can be annotated with the categories you want
to focus on.

Runs are stored locally per owner and optionally mirrored to a shared
document directory.

Configuration files are loaded from (in priority order):
1. SELFCHECK_* environment variables (e.g. SELFCHECK_STORAGE__OWNER)
2. --config <path>       Explicit config file
3. ./selfcheck.toml      Project-level config
4. ~/.config/selfcheck/config.toml   Global config

Example:
  selfcheck seed
  selfcheck take s_default_v1
  selfcheck answer s_default_v1 p_energy 7
  selfcheck runs --survey s_default_v1
  selfcheck results --latest s_default_v1
  selfcheck focus r_lx3k2_ab12cd34 rank c_mood c_focus
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Owner uid for run storage (anonymous when omitted or empty)
    #[arg(long, global = true, value_name = "UID")]
    pub owner: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Keep everything in memory for this invocation (nothing is written)
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored survey blueprints
    Surveys,

    /// Show one blueprint with its categories and prompts
    Show { survey_id: String },

    /// Check a blueprint JSON file without saving it
    Validate { file: PathBuf },

    /// Validate a blueprint JSON file and save it
    Import { file: PathBuf },

    /// Store the built-in blueprint when no blueprint exists yet
    Seed,

    /// Edit a stored blueprint
    Edit {
        survey_id: String,
        #[command(subcommand)]
        edit: EditCommand,
    },

    /// Take a survey interactively (resumes an unfinished run)
    Take {
        survey_id: String,
        /// Start a new run even if an unfinished one exists
        #[arg(long)]
        reassess: bool,
    },

    /// Record a single answer in the current run of a survey
    Answer {
        survey_id: String,
        prompt_id: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Show the results of a run
    Results {
        #[arg(required_unless_present = "latest")]
        run_id: Option<String>,
        /// Show the latest completed run of this survey instead
        #[arg(long, value_name = "SURVEY_ID", conflicts_with = "run_id")]
        latest: Option<String>,
    },

    /// List runs, newest first
    Runs {
        /// Only runs of this survey
        #[arg(long, value_name = "SURVEY_ID")]
        survey: Option<String>,
    },

    /// Choose focus categories on a completed run
    Focus {
        run_id: String,
        #[command(subcommand)]
        selection: FocusCommand,
    },

    /// Delete a run
    RemoveRun { run_id: String },

    /// Push local runs to the mirror and retry failed pushes
    Sync {
        /// Only push the latest run of this survey
        #[arg(long, value_name = "SURVEY_ID")]
        survey: Option<String>,
        /// Pull the latest completed runs missing locally
        #[arg(long)]
        hydrate: bool,
    },

    /// Copy a blueprint from the mirror into local storage
    Pull { survey_id: String },

    /// Show configuration file locations and the effective configuration
    ShowConfig,
}

#[derive(Subcommand, Debug)]
pub enum FocusCommand {
    /// Ordered top categories (first = highest priority)
    Rank { categories: Vec<String> },

    /// Spread the point budget, e.g. `c_energy=4 c_mood=6`
    Points {
        #[arg(value_parser = parse_allocation)]
        allocations: Vec<(String, f64)>,
    },
}

#[derive(Subcommand, Debug)]
pub enum EditCommand {
    /// Change the title
    Title { title: String },

    /// Change the answer scale
    Scale {
        #[arg(allow_negative_numbers = true)]
        min: f64,
        #[arg(allow_negative_numbers = true)]
        max: f64,
        step: f64,
    },

    /// Append a category
    AddCategory { category_id: String, label: String },

    /// Append a prompt
    AddPrompt {
        prompt_id: String,
        category_id: String,
        text: String,
        /// Optional hint shown under the prompt
        #[arg(long)]
        help: Option<String>,
    },

    /// Remove a prompt
    RemovePrompt { prompt_id: String },

    /// Move a prompt to a 1-based position
    MovePrompt { prompt_id: String, position: usize },
}

/// Parse `category=points`.
pub fn parse_allocation(s: &str) -> Result<(String, f64), String> {
    let (category, points) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=POINTS, got '{}'", s))?;
    let category = category.trim();
    if category.is_empty() {
        return Err(format!("missing category in '{}'", s));
    }
    let points = points
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid points in '{}': {}", s, e))?;
    Ok((category.to_string(), points))
}
