//! CLI binary for invoicegen.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `StudioConfig` and drives the session actions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use invoicegen::{
    format_amount, EditingSession, EnvTokenIdentity, Invoice, PipelineProgress,
    PipelineProgressCallback, PipelineStep, StudioConfig, Template, UploadSource,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one spinner that tracks the current pipeline step.
/// The spinner doubles as the "control is disabled" signal — it spins for
/// exactly as long as the action is in flight.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PipelineProgressCallback for CliProgress {
    fn on_action_start(&self, action: &str) {
        self.bar.set_prefix(capitalise(action));
    }

    fn on_step_start(&self, step: PipelineStep) {
        self.bar.set_message(step.label().to_string());
    }

    fn on_step_complete(&self, step: PipelineStep) {
        self.bar.println(format!("  {} {}", green("✓"), step.label()));
    }

    fn on_step_error(&self, step: PipelineStep, error: &str) {
        self.bar
            .println(format!("  {} {}: {}", red("✗"), step.label(), red(error)));
    }

    fn on_action_complete(&self, _action: &str, _success: bool) {
        self.bar.finish_and_clear();
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start a fresh invoice file (generated INV- number included)
  invoicegen new -o draft.json

  # Inspect the computed totals
  invoicegen totals draft.json

  # Preview as a PNG at 2x
  invoicegen render draft.json --template modern -o preview.png

  # Export a paginated A4 PDF into the current directory
  invoicegen export draft.json --template classic

  # Save to the invoice-store (uploads thumbnail + logo first)
  invoicegen save draft.json --template modern \
      --cloud-name demo --store-url http://localhost:8080/api

  # List stored invoices / delete one
  invoicegen list --store-url http://localhost:8080/api
  invoicegen delete --id 42 --store-url http://localhost:8080/api

TEMPLATES:
  classic   navy rules, understated
  modern    violet accents, heavier rules
  minimal   grey, centred heading
  bold      full-bleed accent header band

ENVIRONMENT VARIABLES:
  INVOICEGEN_CLOUD_NAME   Object-storage cloud name (as --cloud-name)
  INVOICEGEN_STORE_URL    Invoice-store base URL (as --store-url)
  INVOICEGEN_FONT         Path to a .ttf used for rendering (as --font)
  INVOICEGEN_TOKEN        When set, saving requires it to be non-empty
"#;

/// Assemble, preview and export invoices from the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "invoicegen",
    version,
    about = "Assemble invoices, preview them against templates, and export PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Object-storage cloud name.
    #[arg(long, env = "INVOICEGEN_CLOUD_NAME", global = true)]
    cloud_name: Option<String>,

    /// Invoice-store base URL, e.g. http://localhost:8080/api.
    #[arg(long, env = "INVOICEGEN_STORE_URL", global = true)]
    store_url: Option<String>,

    /// Path to a .ttf font used for rendering.
    #[arg(long, env = "INVOICEGEN_FONT", global = true)]
    font: Option<PathBuf>,

    /// Currency prefix on rendered amounts.
    #[arg(long, default_value = "$", global = true)]
    currency: String,

    /// Capture oversampling factor (1.0–4.0).
    #[arg(long, default_value_t = 2.0, global = true)]
    scale: f32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a fresh invoice (defaults + generated number) as JSON.
    New {
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the derived totals for an invoice file.
    Totals { file: PathBuf },
    /// List the known templates.
    Templates,
    /// Capture the invoice and write a PNG preview.
    Render {
        file: PathBuf,
        /// Template id (falls back to the one stored on the invoice).
        #[arg(short, long)]
        template: Option<String>,
        #[arg(short, long, default_value = "invoice.png")]
        output: PathBuf,
    },
    /// Capture the invoice and export a paginated A4 PDF.
    Export {
        file: PathBuf,
        #[arg(short, long)]
        template: Option<String>,
        /// Directory the invoice_<millis>.pdf file is written into.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Upload a logo image and print its durable URL.
    UploadLogo { file: PathBuf },
    /// Capture, upload assets and save the invoice to the store.
    Save {
        file: PathBuf,
        #[arg(short, long)]
        template: Option<String>,
        /// Write the saved record (with durable URLs) back to the file.
        #[arg(long)]
        update: bool,
    },
    /// Delete an invoice from the store.
    Delete {
        /// Invoice file; its id field selects the record.
        file: Option<PathBuf>,
        /// Delete by raw id instead of a file.
        #[arg(long, conflicts_with = "file")]
        id: Option<String>,
    },
    /// List invoices stored in the invoice-store.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the user-facing feedback; keep library logs at
    // error level unless verbose output was asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let show_progress = !cli.quiet;
    let config = build_config(&cli, show_progress)?;

    match &cli.command {
        Command::New { output } => {
            let session = EditingSession::new();
            let json = serde_json::to_string_pretty(session.invoice())
                .context("Failed to serialise the fresh invoice")?;
            match output {
                Some(path) => {
                    std::fs::write(path, &json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    if !cli.quiet {
                        eprintln!("{} {}", green("✔"), bold(&path.display().to_string()));
                    }
                }
                None => println!("{json}"),
            }
        }

        Command::Totals { file } => {
            let session = load_session(file)?;
            let totals = session.totals();
            println!("Subtotal     {}{}", cli.currency, format_amount(totals.subtotal));
            println!("Tax amount   {}{}", cli.currency, format_amount(totals.tax_amount));
            println!("Grand total  {}{}", cli.currency, format_amount(totals.grand_total));
        }

        Command::Templates => {
            for t in Template::ALL {
                println!("{:<10} {}", t.id(), dim(t.label()));
            }
        }

        Command::Render {
            file,
            template,
            output,
        } => {
            let mut session = load_session(file)?;
            apply_template(&mut session, template.as_deref())?;
            session
                .validate_for_preview()
                .context("Invoice is not ready to preview")?;
            let template = session.template().expect("template applied above");
            let bitmap = invoicegen::capture_invoice(session.invoice(), template, &config)
                .await
                .context("Capture failed")?;
            bitmap
                .save(output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            if !cli.quiet {
                eprintln!(
                    "{} {}  {}",
                    green("✔"),
                    bold(&output.display().to_string()),
                    dim(&format!("{}x{}", bitmap.width(), bitmap.height()))
                );
            }
        }

        Command::Export { file, template, dir } => {
            let mut session = load_session(file)?;
            apply_template(&mut session, template.as_deref())?;
            let config = StudioConfig {
                output_dir: dir.clone(),
                ..config
            };
            let path = session.download(&config).await.context("Export failed")?;
            if !cli.quiet {
                eprintln!("{} {}", green("✔"), bold(&path.display().to_string()));
            }
        }

        Command::UploadLogo { file } => {
            let data = std::fs::read(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "logo".to_string());
            let url = invoicegen::upload_logo(UploadSource::Bytes { data, filename }, &config)
                .await
                .context("Logo upload failed")?;
            println!("{url}");
        }

        Command::Save {
            file,
            template,
            update,
        } => {
            let mut session = load_session(file)?;
            apply_template(&mut session, template.as_deref())?;
            session.save(&config).await.context("Save failed")?;
            if *update {
                let json = serde_json::to_string_pretty(session.invoice())
                    .context("Failed to serialise the saved invoice")?;
                std::fs::write(file, json)
                    .with_context(|| format!("Failed to update {}", file.display()))?;
            }
            if !cli.quiet {
                let thumb = session.invoice().thumbnail_url.as_deref().unwrap_or("-");
                eprintln!("{} saved  {}", green("✔"), dim(thumb));
            }
        }

        Command::Delete { file, id } => {
            let mut session = match (file, id) {
                (Some(path), _) => load_session(path)?,
                (None, Some(id)) => EditingSession::from_record(Invoice {
                    id: Some(id.clone()),
                    ..Invoice::new()
                }),
                (None, None) => anyhow::bail!("pass an invoice file or --id"),
            };
            session.delete(&config).await.context("Delete failed")?;
            if !cli.quiet {
                eprintln!("{} deleted", green("✔"));
            }
        }

        Command::List => {
            let invoices = invoicegen::list_invoices(&config)
                .await
                .context("Failed to list invoices")?;
            if invoices.is_empty() {
                eprintln!("no stored invoices");
            }
            for inv in invoices {
                let totals = invoicegen::compute_totals(&inv.items, &inv.tax);
                println!(
                    "{:<12} {:<28} {:>12}  {}",
                    inv.meta.number,
                    inv.title,
                    format!("{}{}", cli.currency, format_amount(totals.grand_total)),
                    dim(inv.id.as_deref().unwrap_or("-")),
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `StudioConfig`.
fn build_config(cli: &Cli, show_progress: bool) -> Result<StudioConfig> {
    let mut builder = StudioConfig::builder()
        .capture_scale(cli.scale)
        .currency(cli.currency.clone());

    if let Some(ref name) = cli.cloud_name {
        builder = builder.cloud_name(name.clone());
    }
    if let Some(ref url) = cli.store_url {
        builder = builder.store_base_url(url.clone());
    }
    if let Some(ref font) = cli.font {
        builder = builder.font_path(font.clone());
    }
    if std::env::var_os(EnvTokenIdentity::DEFAULT_VAR).is_some() {
        builder = builder.identity(Arc::new(EnvTokenIdentity::default()));
    }
    if show_progress {
        builder = builder.progress_callback(CliProgress::new() as PipelineProgress);
    }

    builder.build().context("Invalid configuration")
}

/// Load an invoice file into an editing session.
fn load_session(path: &PathBuf) -> Result<EditingSession> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let invoice: Invoice = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid invoice file", path.display()))?;
    Ok(EditingSession::from_record(invoice))
}

/// Apply a `--template` argument, falling back to the invoice's stored
/// selection; neither present is an error.
fn apply_template(session: &mut EditingSession, arg: Option<&str>) -> Result<()> {
    if let Some(id) = arg {
        // select_template keeps the old selection on unknown ids; surface
        // that as a CLI error instead of silently rendering the old one.
        if Template::parse(id).is_none() {
            anyhow::bail!(
                "unknown template '{id}' — known templates: {}",
                Template::ALL.map(|t| t.id()).join(", ")
            );
        }
        session.select_template(id);
    }
    if session.template().is_none() {
        anyhow::bail!("no template selected: pass --template or set one on the invoice file");
    }
    Ok(())
}
