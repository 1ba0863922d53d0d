//! Command handlers for the `fence-estimator` binary.
//!
//! Each command opens the configured repository, runs one operation and
//! writes a human-readable report to the given writer.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use fence_core::calculations::common::{format_money, round_half_up};
use fence_core::links::{mailto_link, sms_link, tel_link};
use fence_core::{
    DbConfig, EstimateDraft, Material, PricingEngine, Quote, QuoteRepository, QuoteStatus,
    RepositoryRegistry, Totals, filter_by_status,
};
use fence_db_sqlite::SqliteRepositoryFactory;
use tracing::{info, warn};

use crate::cli::{Command, EstimateArgs};
use crate::config::AppConfig;
use crate::csv_export;
use crate::utils::opt_decimal_display;

/// Build a [`RepositoryRegistry`] with every backend compiled into this
/// binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn QuoteRepository>> {
    build_registry().create(config).await.with_context(|| {
        format!(
            "cannot open {} store '{}'",
            config.backend, config.connection_string
        )
    })
}

/// Runs one command against the store described by `config`.
pub async fn run(
    command: Command,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<()> {
    if let Command::Price { estimate } = &command {
        return price(estimate, config, out);
    }

    let repo = open_repository(&config.db_config()).await?;
    let app = App {
        repo: repo.as_ref(),
        config,
    };

    match command {
        Command::Price { .. } => Ok(()),
        Command::New => app.new_estimate(out).await,
        Command::Save { estimate, as_new } => app.save(&estimate, as_new, out).await,
        Command::List { status } => app.list(status, out).await,
        Command::Show { id } => app.show(&id, out).await,
        Command::Open { id } => app.open(&id, out).await,
        Command::Active => app.active(out).await,
        Command::Status { id, status } => app.set_status(&id, status, out).await,
        Command::Delete { id } => app.delete(&id, out).await,
        Command::Links { id } => app.links(id.as_deref(), out).await,
        Command::ExportCsv { path, status } => app.export_csv(&path, status, out).await,
    }
}

/// Prices the given inputs on top of the configured defaults. Nothing is
/// saved.
pub fn price(
    args: &EstimateArgs,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let mut draft = EstimateDraft::with_pricing(config.pricing());
    args.apply(&mut draft);
    log_input_warnings(&draft);

    write!(out, "{}", render_totals(&draft.totals()))?;
    Ok(())
}

/// Command handlers that need a repository.
pub struct App<'a> {
    pub repo: &'a dyn QuoteRepository,
    pub config: &'a AppConfig,
}

impl App<'_> {
    pub async fn new_estimate(
        &self,
        out: &mut dyn Write,
    ) -> Result<()> {
        let draft = EstimateDraft::with_pricing(self.config.pricing());
        self.repo.set_active(&draft.id).await?;

        info!(id = %draft.id, "started new estimate");
        writeln!(out, "Started new estimate {}", draft.id)?;
        Ok(())
    }

    /// The active estimate ready for editing. A started but never saved
    /// estimate comes back blank under its reserved id.
    pub async fn active_draft(&self) -> Result<EstimateDraft> {
        let active = self.repo.get_active().await?;
        if active.is_empty() {
            return Ok(EstimateDraft::with_pricing(self.config.pricing()));
        }
        Ok(match self.repo.get_by_id(&active).await? {
            Some(quote) => EstimateDraft::from_quote(&quote),
            None => EstimateDraft {
                id: active,
                ..EstimateDraft::with_pricing(self.config.pricing())
            },
        })
    }

    pub async fn save(
        &self,
        args: &EstimateArgs,
        as_new: bool,
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut draft = self.active_draft().await?;
        args.apply(&mut draft);
        log_input_warnings(&draft);

        let quote = if as_new {
            draft.save_as_new(self.repo).await?
        } else {
            draft.save(self.repo).await?
        };

        writeln!(out, "Saved {}", quote.id)?;
        write!(out, "{}", render_quote(&quote))?;
        Ok(())
    }

    pub async fn list(
        &self,
        status: Option<QuoteStatus>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let quotes = self.repo.list_all().await?;
        let active = self.repo.get_active().await?;
        let shown = filter_by_status(&quotes, status);

        if shown.is_empty() {
            writeln!(out, "No saved quotes.")?;
            return Ok(());
        }
        for quote in shown {
            writeln!(out, "{}", render_list_line(quote, quote.id == active))?;
        }
        Ok(())
    }

    pub async fn show(
        &self,
        id: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        let quote = self.require(id).await?;
        write!(out, "{}", render_quote(&quote))?;
        Ok(())
    }

    pub async fn open(
        &self,
        id: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        let quote = self.require(id).await?;
        self.repo.set_active(&quote.id).await?;
        writeln!(out, "Opened {}: {}", quote.id, quote.title)?;
        Ok(())
    }

    pub async fn active(
        &self,
        out: &mut dyn Write,
    ) -> Result<()> {
        let id = self.repo.get_active().await?;
        if id.is_empty() {
            writeln!(out, "No active estimate.")?;
            return Ok(());
        }
        match self.repo.get_by_id(&id).await? {
            Some(quote) => write!(out, "{}", render_quote(&quote))?,
            None => writeln!(out, "{id} (not saved yet)")?,
        }
        Ok(())
    }

    pub async fn set_status(
        &self,
        id: &str,
        status: QuoteStatus,
        out: &mut dyn Write,
    ) -> Result<()> {
        match self.repo.set_status(id, status).await? {
            Some(quote) => writeln!(out, "{} is now {}", quote.id, quote.status)?,
            None => bail!("no saved quote with id '{id}'"),
        }
        Ok(())
    }

    pub async fn delete(
        &self,
        id: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        if self.repo.get_by_id(id).await?.is_none() {
            warn!(id, "delete requested for unknown quote");
            writeln!(out, "No saved quote with id '{id}'.")?;
            return Ok(());
        }
        self.repo.remove(id).await?;
        writeln!(out, "Deleted {id}")?;
        Ok(())
    }

    pub async fn links(
        &self,
        id: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let id = match id {
            Some(id) => id.to_string(),
            None => self.repo.get_active().await?,
        };
        if id.is_empty() {
            bail!("no quote given and no active estimate");
        }
        let quote = self.require(&id).await?;

        let customer = &quote.customer;
        let links = [
            ("Call", tel_link(&customer.phone)),
            ("Email", mailto_link(&customer.email)),
            (
                "Text",
                sms_link(&customer.phone, &self.config.business.name, quote.totals.total),
            ),
        ];

        let mut any = false;
        for (label, link) in links {
            if let Some(link) = link {
                writeln!(out, "{label:<6}{link}")?;
                any = true;
            }
        }
        if !any {
            writeln!(out, "No phone or email on file for {}.", quote.id)?;
        }
        Ok(())
    }

    pub async fn export_csv(
        &self,
        path: &Path,
        status: Option<QuoteStatus>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let quotes = self.repo.list_all().await?;
        let shown = filter_by_status(&quotes, status);
        let count = csv_export::export_to_file(path, shown)?;

        info!(count, path = %path.display(), "exported quotes");
        writeln!(out, "Exported {count} quotes to {}", path.display())?;
        Ok(())
    }

    async fn require(
        &self,
        id: &str,
    ) -> Result<Quote> {
        match self.repo.get_by_id(id).await? {
            Some(quote) => Ok(quote),
            None => bail!("no saved quote with id '{id}'"),
        }
    }
}

fn log_input_warnings(draft: &EstimateDraft) {
    for warning in PricingEngine::input_warnings(&draft.inputs, &draft.pricing) {
        warn!(id = %draft.id, "{warning}");
    }
}

// ─── rendering ───────────────────────────────────────────────────────────────

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_totals(totals: &Totals) -> String {
    format!(
        "Linear feet:    {}\n\
         Labor hours:    {:.2}\n\
         Labor cost:     {}\n\
         Material cost:  {}\n\
         Total:          {}\n",
        round_half_up(totals.total_lf).normalize(),
        round_half_up(totals.labor_hours),
        format_money(totals.labor_cost),
        format_money(totals.material_cost),
        format_money(totals.total),
    )
}

pub fn render_list_line(
    quote: &Quote,
    active: bool,
) -> String {
    format!(
        "{} {:<36} {:<7} {} {:>12}  {}",
        if active { "*" } else { " " },
        quote.id,
        quote.status.as_str(),
        local_time(quote.updated_at),
        format_money(quote.totals.total),
        quote.title,
    )
}

fn describe_fence(quote: &Quote) -> String {
    let inputs = &quote.inputs;
    let mut text = format!("{} ft {}", inputs.height_ft.normalize(), inputs.material);
    if inputs.material == Material::Wood {
        text.push_str(&format!(" ({}, {} posts)", inputs.wood_type, inputs.post_size));
    }
    text.push_str(&format!(", {} corners", inputs.corners));
    if inputs.slope {
        text.push_str(", slope");
    }
    if inputs.rocky {
        text.push_str(", rocky soil");
    }
    text
}

pub fn render_quote(quote: &Quote) -> String {
    let mut lines = vec![
        quote.title.clone(),
        format!("  Id:             {}", quote.id),
        format!("  Status:         {}", quote.status),
        format!("  Created:        {}", local_time(quote.created_at)),
        format!("  Updated:        {}", local_time(quote.updated_at)),
    ];

    let customer = &quote.customer;
    let contact: Vec<&str> = [&customer.name, &customer.phone, &customer.email, &customer.address]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !contact.is_empty() {
        lines.push(format!("  Customer:       {}", contact.join(", ")));
    }

    lines.push(format!("  Fence:          {}", describe_fence(quote)));
    lines.push(format!(
        "  Gates:          {} walk, {} double",
        quote.inputs.gates_walk, quote.inputs.gates_double
    ));
    for segment in &quote.inputs.segments {
        lines.push(format!(
            "  Segment {:<7} {} ft",
            segment.name,
            opt_decimal_display(&segment.length_ft)
        ));
    }
    if !quote.notes.trim().is_empty() {
        lines.push(format!("  Notes:          {}", quote.notes.trim()));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    for line in render_totals(&quote.totals).lines() {
        text.push_str("  ");
        text.push_str(line);
        text.push('\n');
    }
    text
}
