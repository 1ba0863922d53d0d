use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fence_core::{EstimateDraft, Material, PostSize, QuoteStatus, WoodType, segment_label};
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::utils::{parse_decimal, parse_optional_decimal};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Fence installation estimator.
///
/// Prices fence jobs from measured segments and site conditions, and keeps
/// saved quotes with their status in a local database.
#[derive(Debug, Parser)]
#[command(name = "fence-estimator", version)]
pub struct Cli {
    /// Configuration file (TOML).
    #[arg(long, env = "FENCE_ESTIMATOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend, overriding the config file.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string, overriding the config file.
    /// For SQLite this is a file path (e.g. `estimates.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log filter, e.g. `debug` or `fence_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Hide log output on the console.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config file.
    pub fn apply_overrides(
        &self,
        config: &mut AppConfig,
    ) {
        if let Some(backend) = &self.backend {
            config.database.backend = backend.clone();
        }
        if let Some(db) = &self.db {
            config.database.connection_string = db.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a job without saving it.
    Price {
        #[command(flatten)]
        estimate: EstimateArgs,
    },

    /// Start a new estimate; its id becomes the active quote.
    New,

    /// Apply changes to the active estimate and save it.
    Save {
        #[command(flatten)]
        estimate: EstimateArgs,

        /// Save a copy under a new id instead of updating the active quote.
        #[arg(long)]
        as_new: bool,
    },

    /// List saved quotes, newest first.
    List {
        #[arg(long)]
        status: Option<QuoteStatus>,
    },

    /// Show one saved quote.
    Show { id: String },

    /// Make a saved quote the active estimate.
    Open { id: String },

    /// Show the active estimate.
    Active,

    /// Mark a quote pending, sold or void.
    Status { id: String, status: QuoteStatus },

    /// Delete a saved quote.
    Delete { id: String },

    /// Print call, email and text-message links for a quote.
    Links {
        /// Quote id; defaults to the active estimate.
        id: Option<String>,
    },

    /// Write saved quotes to a CSV file.
    ExportCsv {
        path: PathBuf,

        #[arg(long)]
        status: Option<QuoteStatus>,
    },
}

// ─── estimate inputs ─────────────────────────────────────────────────────────

/// One `--segment` value: `120`, `A-B=120`, or `A-B=` for a length not
/// yet measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentArg {
    pub name: Option<String>,
    pub length_ft: Option<Decimal>,
}

fn parse_segment(s: &str) -> Result<SegmentArg, String> {
    let (name, length) = match s.split_once('=') {
        Some((name, length)) => {
            let name = name.trim();
            ((!name.is_empty()).then(|| name.to_string()), length)
        }
        None => (None, s),
    };
    Ok(SegmentArg {
        name,
        length_ft: parse_optional_decimal(length),
    })
}

/// Job and customer fields. Anything left out keeps its current value.
#[derive(Debug, Clone, Default, Args)]
pub struct EstimateArgs {
    /// Fence run, repeatable: `120` or `A-B=120`. Replaces all segments.
    #[arg(long = "segment", value_name = "[NAME=]FEET", value_parser = parse_segment)]
    pub segments: Vec<SegmentArg>,

    #[arg(long)]
    pub corners: Option<u32>,

    /// Fence height in feet.
    #[arg(long, value_parser = parse_decimal)]
    pub height: Option<Decimal>,

    /// wood, vinyl or chain.
    #[arg(long)]
    pub material: Option<Material>,

    /// pt, cedar or cedartone. Wood only.
    #[arg(long)]
    pub wood_type: Option<WoodType>,

    /// 4x4 or 6x6. Wood only.
    #[arg(long)]
    pub post_size: Option<PostSize>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub slope: Option<bool>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub rocky: Option<bool>,

    #[arg(long)]
    pub gates_walk: Option<u32>,

    #[arg(long)]
    pub gates_double: Option<u32>,

    /// Material markup as a fraction, e.g. `0.20` for 20%.
    #[arg(long, value_parser = parse_decimal)]
    pub markup: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub equipment_fee: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub delivery_fee: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub disposal_fee: Option<Decimal>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub customer_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub address: Option<String>,
}

impl EstimateArgs {
    /// Writes every given field into `draft`.
    pub fn apply(
        &self,
        draft: &mut EstimateDraft,
    ) {
        if !self.segments.is_empty() {
            draft.inputs.segments.clear();
            for (index, arg) in self.segments.iter().enumerate() {
                let id = draft.add_segment();
                let name = arg.name.clone().unwrap_or_else(|| segment_label(index));
                draft.update_segment(&id, name, arg.length_ft);
            }
        }

        let inputs = &mut draft.inputs;
        set(&mut inputs.corners, self.corners);
        set(&mut inputs.height_ft, self.height);
        set(&mut inputs.material, self.material);
        set(&mut inputs.wood_type, self.wood_type);
        set(&mut inputs.post_size, self.post_size);
        set(&mut inputs.slope, self.slope);
        set(&mut inputs.rocky, self.rocky);
        set(&mut inputs.gates_walk, self.gates_walk);
        set(&mut inputs.gates_double, self.gates_double);

        let pricing = &mut draft.pricing;
        set(&mut pricing.material_markup_pct, self.markup);
        set(&mut pricing.equipment_fee, self.equipment_fee);
        set(&mut pricing.delivery_fee, self.delivery_fee);
        set(&mut pricing.disposal_fee, self.disposal_fee);

        set(&mut draft.title, self.title.clone());
        set(&mut draft.notes, self.notes.clone());
        let customer = &mut draft.customer;
        set(&mut customer.name, self.customer_name.clone());
        set(&mut customer.phone, self.phone.clone());
        set(&mut customer.email, self.email.clone());
        set(&mut customer.address, self.address.clone());
    }
}

fn set<T>(
    field: &mut T,
    value: Option<T>,
) {
    if let Some(value) = value {
        *field = value;
    }
}
