//! Zarc - market intelligence report CLI
//!
//! The `zarc` command configures, generates, browses and exports reports.
//!
//! ## Commands
//!
//! - `industries` / `modules`: Show the selectable reference lists
//! - `generate`: Run the report wizard end to end
//! - `reports` / `folders`: Browse the report catalog
//! - `view` / `export`: Read or download a report
//! - `wizard`: Interactive step-by-step wizard
//! - `taxonomy`: Browse the admin industry taxonomy
//! - `signup` / `signin` / `signout`: Backend account

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use zarc_api::{ApiClient, ApiConfig, SignInRequest, SignUpRequest};
use zarc_core::filter::{self, IndustryFilter, SortMode};
use zarc_core::{
    export_report, ExportFormat, MemoryCatalog, NoticeLevel, NoticeQueue, ReferenceData, Report,
    ReportCatalog, ReportId, ReportViewer, ReportWizard, StepStatus, TaxonomyRegistry, WizardStep,
    ZarcConfig, METRICS,
};

#[derive(Parser)]
#[command(name = "zarc")]
#[command(author = "Zarc Engineering")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Zarc market intelligence reports", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory exported documents are written to
    #[arg(long, global = true, env = "ZARC_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Simulated report generation time in milliseconds
    #[arg(long, global = true, env = "ZARC_SYNTHESIS_DELAY_MS")]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List industries
    Industries {
        /// Only show industries whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// List analysis modules
    Modules {
        /// Only show modules whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Generate a report for an industry
    Generate {
        /// Industry id (see `zarc industries`)
        #[arg(short, long)]
        industry: String,

        /// Module id to include; repeat for several (default: all modules)
        #[arg(short, long = "module")]
        modules: Vec<String>,

        /// Also export the new report in this format
        #[arg(short, long)]
        export: Option<ExportFormat>,
    },

    /// Browse the report catalog
    Reports {
        /// Only show reports whose title contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Industry label, or "all"
        #[arg(short, long, default_value = IndustryFilter::ALL)]
        industry: String,

        /// Sort by "date" (newest first) or "name"
        #[arg(long, default_value = "date")]
        sort: SortMode,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Report counts per industry
    Folders,

    /// Read a report
    View {
        /// Report id, e.g. REP-001
        id: String,

        /// Show only this section
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Export a report as a document
    Export {
        /// Report id, e.g. REP-001
        id: String,

        /// markdown, text or json
        #[arg(short, long, default_value = "markdown")]
        format: ExportFormat,

        /// Export only this section
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Interactive report wizard
    Wizard,

    /// Browse the admin industry taxonomy
    Taxonomy {
        /// Only show industries whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Create a backend account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "ZARC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in to the backend
    Signin {
        /// Email address or username
        #[arg(long)]
        email: String,
        #[arg(long, env = "ZARC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored access token
    Signout,
}

/// Shared state for one CLI invocation.
struct App {
    config: ZarcConfig,
    catalog: Arc<dyn ReportCatalog>,
    reference: Arc<ReferenceData>,
}

impl App {
    fn new(config: ZarcConfig) -> Self {
        let catalog: Arc<dyn ReportCatalog> = if config.seed_catalog {
            Arc::new(MemoryCatalog::seeded())
        } else {
            Arc::new(MemoryCatalog::new())
        };
        Self {
            config,
            catalog,
            reference: Arc::new(ReferenceData::builtin()),
        }
    }

    fn wizard(&self) -> ReportWizard {
        ReportWizard::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.reference),
            &self.config,
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let config = ZarcConfig::from_env();
    zarc_core::init_tracing(cli.json || config.log_json, level);

    let mut config = config;
    if let Some(dir) = cli.export_dir {
        config = config.with_export_dir(dir);
    }
    if let Some(ms) = cli.delay_ms {
        config = config.with_synthesis_delay(std::time::Duration::from_millis(ms));
    }
    let app = App::new(config);

    let result = match cli.command {
        Commands::Industries { search } => cmd_industries(&app, &search),
        Commands::Modules { search } => cmd_modules(&app, &search),
        Commands::Generate {
            industry,
            modules,
            export,
        } => cmd_generate(&app, &industry, &modules, export).await,
        Commands::Reports {
            search,
            industry,
            sort,
            page,
        } => cmd_reports(&app, &search, &industry, sort, page),
        Commands::Folders => cmd_folders(&app),
        Commands::View { id, section } => cmd_view(&app, &id, section.as_deref()),
        Commands::Export {
            id,
            format,
            section,
        } => cmd_export(&app, &id, format, section.as_deref()).await,
        Commands::Wizard => cmd_wizard(&app).await,
        Commands::Taxonomy { search, page } => cmd_taxonomy(&app, &search, page),
        Commands::Signup {
            email,
            username,
            password,
        } => cmd_signup(&email, &username, &password).await,
        Commands::Signin { email, password } => cmd_signin(&email, &password).await,
        Commands::Signout => cmd_signout(),
    };

    METRICS.flush();
    result
}

/// List industries
fn cmd_industries(app: &App, search: &str) -> Result<()> {
    let industries = filter::filter_by_label(app.reference.industries(), search);
    if industries.is_empty() {
        println!("No industries match '{}'", search);
        return Ok(());
    }
    for industry in industries {
        println!("{:<20} {}", industry.id, industry.label);
    }
    Ok(())
}

/// List analysis modules
fn cmd_modules(app: &App, search: &str) -> Result<()> {
    let modules = filter::filter_by_label(app.reference.modules(), search);
    if modules.is_empty() {
        println!("No modules match '{}'", search);
        return Ok(());
    }
    for module in modules {
        println!(
            "{:<20} {:<30} {}",
            module.id,
            module.label,
            module.category.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Drive the wizard from arguments instead of prompts.
async fn cmd_generate(
    app: &App,
    industry: &str,
    modules: &[String],
    export: Option<ExportFormat>,
) -> Result<()> {
    let mut wizard = app.wizard();
    wizard
        .select_industry(industry)
        .with_context(|| format!("Cannot select industry '{}'", industry))?;

    if !modules.is_empty() {
        wizard.deselect_all_visible()?;
        for module in modules {
            if wizard.selected_modules().iter().any(|m| &m.id == module) {
                continue;
            }
            wizard
                .toggle_module(module)
                .with_context(|| format!("Cannot select module '{}'", module))?;
        }
    }
    wizard.validate_generate()?;

    println!(
        "Synthesizing {} report with {} module(s)...",
        wizard.selected_industry().map(|i| i.label.as_str()).unwrap_or("?"),
        wizard.selected_modules().len()
    );
    let Some(id) = wizard.generate().await else {
        bail!("Report generation was not started");
    };

    let report = app.catalog.get(&id)?;
    print_report_header(&report);

    if let Some(format) = export {
        export_and_announce(app, &id, format, None).await?;
    }
    Ok(())
}

/// Browse the report catalog
fn cmd_reports(app: &App, search: &str, industry: &str, sort: SortMode, page: usize) -> Result<()> {
    let industry: IndustryFilter = match industry.parse() {
        Ok(filter) => filter,
        Err(never) => match never {},
    };
    let all = app.catalog.list_all();
    let matching = filter::sort_reports(&filter::filter_reports(&all, search, &industry), sort);
    let page_size = app.config.page_size;
    let pages = filter::page_count(matching.len(), page_size);
    let shown = filter::paginate(&matching, page_size, page);

    if shown.is_empty() {
        println!("No reports found.");
        return Ok(());
    }

    println!("{:<18} {:<12} {:<10} {:<20} TITLE", "ID", "DATE", "SIZE", "INDUSTRY");
    for report in &shown {
        println!(
            "{:<18} {:<12} {:<10} {:<20} {}",
            report.id,
            report.created_at.format("%Y-%m-%d"),
            report.file_size,
            report.industry,
            report.title
        );
    }
    println!();
    println!(
        "Page {} of {} ({} report(s), sorted by {})",
        page,
        pages,
        matching.len(),
        sort
    );
    Ok(())
}

/// Report counts per industry
fn cmd_folders(app: &App) -> Result<()> {
    let reports = app.catalog.list_all();
    for group in filter::group_by_industry(&reports) {
        println!("{:<24} {} report(s)", group.industry, group.count);
    }
    Ok(())
}

/// Read a report, whole or one section
fn cmd_view(app: &App, id: &str, section: Option<&str>) -> Result<()> {
    let mut viewer = ReportViewer::open(app.catalog.as_ref(), &ReportId::from(id))
        .with_context(|| format!("Cannot open report '{}'", id))?;

    print_report_header(viewer.report());
    match section {
        Some(section) => {
            let nav_id = viewer
                .nav_items()
                .iter()
                .find(|item| item.label.eq_ignore_ascii_case(section))
                .map(|item| item.id.clone())
                .with_context(|| format!("Report '{}' has no section '{}'", id, section))?;
            viewer.select(&nav_id)?;
            print_active_section(&viewer);
        }
        None => loop {
            print_active_section(&viewer);
            if !viewer.has_next() {
                break;
            }
            viewer.next();
        },
    }
    Ok(())
}

/// Export a report to the export directory
async fn cmd_export(app: &App, id: &str, format: ExportFormat, section: Option<&str>) -> Result<()> {
    export_and_announce(app, &ReportId::from(id), format, section).await
}

/// Browse the admin industry taxonomy
fn cmd_taxonomy(app: &App, search: &str, page: usize) -> Result<()> {
    let registry = TaxonomyRegistry::sample(app.config.synthesis_delay());
    let page_size = app.config.page_size;
    let result = registry.search_industries(search, page, page_size);
    if result.items.is_empty() {
        println!("No industries found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<28} {:>7} {:>8} {:>4} {:>9}",
        "ID", "NAME", "MODULES", "KEYWORDS", "URLS", "SELECTORS"
    );
    for industry in &result.items {
        println!(
            "{:<12} {:<28} {:>7} {:>8} {:>4} {:>9}",
            industry.id,
            industry.name,
            industry.modules.len(),
            industry.keywords.len(),
            industry.urls.len(),
            industry.selectors.len()
        );
    }
    let (first, last) = result.showing(page_size);
    println!();
    println!(
        "Showing {} - {} of {} (page {} of {})",
        first, last, result.total, result.page, result.page_count
    );
    Ok(())
}

/// Create a backend account
async fn cmd_signup(email: &str, username: &str, password: &str) -> Result<()> {
    let client = ApiClient::new(ApiConfig::from_env()).context("Failed to create API client")?;
    let response = client
        .signup(&SignUpRequest::new(email, username, password))
        .await
        .context("Sign up failed")?;
    println!("Welcome, {}! You are signed in.", response.user.username);
    Ok(())
}

/// Sign in to the backend
async fn cmd_signin(email: &str, password: &str) -> Result<()> {
    let client = ApiClient::new(ApiConfig::from_env()).context("Failed to create API client")?;
    let response = client
        .signin(&SignInRequest::new(email, password))
        .await
        .context("Sign in failed")?;
    println!("Signed in as {}", response.user.username);
    Ok(())
}

/// Forget the stored access token
fn cmd_signout() -> Result<()> {
    let client = ApiClient::new(ApiConfig::from_env()).context("Failed to create API client")?;
    client.signout().context("Sign out failed")?;
    println!("Signed out");
    Ok(())
}

// ---------------------------------------------------------------------------
// Interactive wizard
// ---------------------------------------------------------------------------

/// Line-driven wizard session on stdin/stdout.
async fn cmd_wizard(app: &App) -> Result<()> {
    let mut wizard = app.wizard();
    let mut notices = NoticeQueue::new();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_stepper(&wizard);
        print_wizard_screen(&wizard);
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        let input = line.trim();
        if input == "q" {
            break;
        }
        if let Some(query) = input.strip_prefix('/') {
            wizard.set_search_query(query);
            continue;
        }

        match wizard.step().clone() {
            WizardStep::SelectIndustry => {
                let Some(id) = resolve_choice(&wizard, input) else {
                    notices.push(format!("No industry '{}'", input), NoticeLevel::Error);
                    print_notices(&mut notices);
                    continue;
                };
                if let Err(e) = wizard.select_industry(&id) {
                    notices.push_error(&e);
                }
            }
            WizardStep::SelectModules => match input {
                "a" => wizard.toggle_all_visible()?,
                "b" => wizard.back()?,
                "g" => {
                    if let Err(e) = wizard.validate_generate() {
                        notices.push_error(&e);
                    } else {
                        println!("Synthesizing...");
                        if let Some(id) = wizard.generate().await {
                            notices.push(format!("Report {} ready", id), NoticeLevel::Success);
                        }
                    }
                }
                other => match resolve_choice(&wizard, other) {
                    Some(id) => wizard.toggle_module(&id)?,
                    None => {
                        notices.push(format!("No module '{}'", other), NoticeLevel::Error);
                    }
                },
            },
            WizardStep::Synthesizing => {}
            WizardStep::Ready { report_id } => match input.split_whitespace().collect::<Vec<_>>()[..] {
                ["v"] => cmd_view(app, report_id.as_str(), None)?,
                ["e"] => {
                    export_with_notice(app, &report_id, ExportFormat::Markdown, &mut notices).await
                }
                ["e", format] => match format.parse::<ExportFormat>() {
                    Ok(format) => export_with_notice(app, &report_id, format, &mut notices).await,
                    Err(e) => {
                        notices.push(e, NoticeLevel::Error);
                    }
                },
                ["r"] => wizard.restart(),
                _ => {
                    notices.push("Use v, e [format], r or q", NoticeLevel::Info);
                }
            },
        }
        print_notices(&mut notices);
    }

    if let WizardStep::Ready { report_id } = wizard.step() {
        info!(report_id = %report_id, "wizard closed with a ready report");
    }
    Ok(())
}

/// A list number (1-based) or option id from the visible list.
fn resolve_choice(wizard: &ReportWizard, input: &str) -> Option<String> {
    let visible = wizard.visible_options();
    if let Ok(n) = input.parse::<usize>() {
        return visible.get(n.checked_sub(1)?).map(|o| o.id.clone());
    }
    visible.iter().find(|o| o.id == input).map(|o| o.id.clone())
}

async fn export_with_notice(
    app: &App,
    id: &ReportId,
    format: ExportFormat,
    notices: &mut NoticeQueue,
) {
    let renderer = format.renderer();
    match export_report(
        app.catalog.as_ref(),
        id,
        None,
        renderer.as_ref(),
        &app.config.export_dir,
    )
    .await
    {
        Ok(outcome) => {
            notices.push(
                format!("Saved {}", outcome.path.display()),
                NoticeLevel::Success,
            );
        }
        Err(e) => {
            notices.push_error(&e);
        }
    }
}

fn print_stepper(wizard: &ReportWizard) {
    let line: Vec<String> = wizard
        .steps()
        .into_iter()
        .map(|entry| match entry.status {
            StepStatus::Done => format!("[x] {}", entry.label),
            StepStatus::Current => format!("[>] {}", entry.label),
            StepStatus::Pending => format!("[ ] {}", entry.label),
        })
        .collect();
    println!();
    println!("{}", line.join("  "));
}

fn print_wizard_screen(wizard: &ReportWizard) {
    match wizard.step() {
        WizardStep::SelectIndustry => {
            println!("Choose an industry (number or id, /text to search, q to quit)");
            for (i, option) in wizard.visible_options().iter().enumerate() {
                let marker = if wizard.selected_industry().map(|s| &s.id) == Some(&option.id) {
                    "*"
                } else {
                    " "
                };
                println!("{:>3}.{} {}", i + 1, marker, option.label);
            }
        }
        WizardStep::SelectModules => {
            println!(
                "{}: toggle modules (number or id, a = all visible, b = back, g = generate, /text to search)",
                wizard.selected_industry().map(|i| i.label.as_str()).unwrap_or("?")
            );
            let selected = wizard.selected_modules();
            for (i, option) in wizard.visible_options().iter().enumerate() {
                let mark = if selected.iter().any(|m| m.id == option.id) {
                    "x"
                } else {
                    " "
                };
                println!(
                    "{:>3}. [{}] {:<30} {}",
                    i + 1,
                    mark,
                    option.label,
                    option.category.as_deref().unwrap_or("")
                );
            }
            println!("{} selected", selected.len());
        }
        WizardStep::Synthesizing => println!("Synthesizing..."),
        WizardStep::Ready { report_id } => {
            println!("Report {} is ready. v = view, e [format] = export, r = new report, q = quit", report_id);
        }
    }
}

/// Drop elapsed notices and format the ones still showing.
fn notice_lines(notices: &mut NoticeQueue, now: Instant) -> Vec<String> {
    notices.expire(now);
    notices
        .visible()
        .iter()
        .map(|n| format!("({}) {}", n.level, n.message))
        .collect()
}

fn print_notices(notices: &mut NoticeQueue) {
    for line in notice_lines(notices, Instant::now()) {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn print_report_header(report: &Report) {
    println!("{}  {}", report.id, report.title);
    println!("Industry:  {}", report.industry);
    println!("Created:   {}", report.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Size:      {}", report.file_size);
    println!("Modules:   {}", report.modules.join(", "));
    println!();
}

fn print_active_section(viewer: &ReportViewer) {
    if let Some(section) = viewer.active_section() {
        println!("== {} ==", section.title);
        println!("{}", section.content);
        println!();
    }
}

async fn export_and_announce(
    app: &App,
    id: &ReportId,
    format: ExportFormat,
    section: Option<&str>,
) -> Result<()> {
    let renderer = format.renderer();
    let outcome = export_report(
        app.catalog.as_ref(),
        id,
        section,
        renderer.as_ref(),
        &app.config.export_dir,
    )
    .await
    .with_context(|| format!("Failed to export report '{}'", id))?;
    println!(
        "Exported {} ({} bytes) to {}",
        id,
        outcome.bytes_written,
        display_path(&outcome.path)
    );
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".")
        .unwrap_or(path)
        .display()
        .to_string()
}
