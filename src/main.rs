// LogDash - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Driving a Dashboard through scope selection, filters and one search
// 4. Printing the result page as a table, CSV or JSON, or one entry in full

use logdash::app::dashboard::Dashboard;
use logdash::app::state::{Notice, NoticeKind};
use logdash::core::export;
use logdash::core::model::Severity;
use logdash::platform::api::HttpApi;
use logdash::platform::config::{self, AppConfig, PlatformPaths};
use logdash::util;
use logdash::util::constants::LEVEL_ALL;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// LogDash - search a partitioned log store from the terminal.
///
/// Pick a client, database and table, narrow by text, severity and time,
/// and print one page of matching log records.
#[derive(Parser, Debug)]
#[command(name = "logdash", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Base URL of the log API, overriding the config file.
    #[arg(long = "api-root")]
    api_root: Option<String>,

    /// Client to select (defaults to none; required for a search).
    #[arg(long)]
    client: Option<String>,

    /// Database to select (defaults to the first one listed for the client).
    #[arg(long)]
    database: Option<String>,

    /// Table to select (defaults to the first one listed for the database).
    #[arg(long)]
    table: Option<String>,

    /// Message text filter.
    #[arg(short = 'm', long)]
    message: Option<String>,

    /// User filter.
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Trace number filter.
    #[arg(short = 't', long = "trace-no")]
    trace_no: Option<String>,

    /// Severity: "all", a label (verbose..fatal) or an ordinal 0-5.
    #[arg(short = 'l', long, value_parser = parse_level)]
    level: Option<i32>,

    /// Flags bitmask filter.
    #[arg(long)]
    flags: Option<u32>,

    /// Start of the time window: YYYY-MM-DD or RFC 3339.
    #[arg(long, value_parser = parse_time)]
    from: Option<DateTime<Local>>,

    /// End of the time window: YYYY-MM-DD or RFC 3339.
    #[arg(long, value_parser = parse_time)]
    to: Option<DateTime<Local>>,

    /// Page to fetch (1-based).
    #[arg(short = 'p', long)]
    page: Option<u32>,

    /// Output format for the result page.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Print one entry of the fetched page in full (error and stack trace).
    #[arg(long, value_name = "ID")]
    detail: Option<String>,

    /// Print the available clients, databases and tables instead of searching.
    #[arg(long = "list-scopes")]
    list_scopes: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn parse_level(s: &str) -> Result<i32, String> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(LEVEL_ALL);
    }
    if let Ok(n) = s.parse::<i32>() {
        return Severity::from_ordinal(n)
            .map(Severity::ordinal)
            .ok_or_else(|| format!("level ordinal {n} is out of range (0-5)"));
    }
    Severity::from_label(s)
        .map(Severity::ordinal)
        .ok_or_else(|| format!("unknown level '{s}'"))
}

fn parse_time(s: &str) -> Result<DateTime<Local>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Local));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("'{s}' is neither YYYY-MM-DD nor RFC 3339"))?;
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .ok_or_else(|| format!("'{s}' does not exist in the local time zone"))
}

fn main() {
    let cli = Cli::parse();

    let (config_path, app_config, warnings) = match load_settings(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "LogDash starting"
    );

    for warning in &warnings {
        eprintln!("Warning: {warning}");
    }

    match run(&cli, &app_config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!(error = %e, "LogDash failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Load config.toml. A file named with --config must exist and parse; the
/// platform default may be absent or broken and falls back to defaults.
fn load_settings(cli: &Cli) -> util::error::Result<(PathBuf, AppConfig, Vec<String>)> {
    match cli.config {
        Some(ref path) => {
            let (app_config, warnings) = config::load_config_strict(path)?;
            Ok((path.clone(), app_config, warnings))
        }
        None => {
            let path = PlatformPaths::resolve().config_file();
            let (app_config, warnings) = config::load_config(&path);
            Ok((path, app_config, warnings))
        }
    }
}

/// Drive one dashboard session. Returns Ok(false) when a failure was
/// reported to the user as a notice.
fn run(cli: &Cli, app_config: &AppConfig) -> util::error::Result<bool> {
    let root = cli.api_root.as_deref().unwrap_or(&app_config.api_root);
    let api = Arc::new(HttpApi::new(root, app_config.request_timeout)?);

    let mut dash = Dashboard::new(api.clone(), api, app_config.page_size);
    // Each settle may chain up to three lookups plus a search.
    let budget = app_config.request_timeout * 4 + Duration::from_secs(1);

    dash.init();
    let mut ok = settle(&mut dash, budget);

    if let Some(ref client) = cli.client {
        dash.set_client(client.as_str());
        ok &= settle(&mut dash, budget);
    }
    if let Some(ref database) = cli.database {
        dash.set_database(database.as_str());
        ok &= settle(&mut dash, budget);
    }
    if let Some(ref table) = cli.table {
        dash.set_table(table.as_str());
    }

    if cli.list_scopes {
        print_scopes(&dash);
        dash.dispose();
        return Ok(ok);
    }

    dash.set_message(cli.message.clone());
    dash.set_user(cli.user.clone());
    dash.set_trace_no(cli.trace_no.clone());
    if let Some(level) = cli.level {
        dash.set_level(level);
    }
    dash.set_flags(cli.flags);
    if cli.from.is_some() || cli.to.is_some() {
        let (from, to) = dash.state().filters().date_range();
        dash.set_date_range(cli.from.or(from), cli.to.or(to));
    }

    let started = match cli.page {
        Some(page) => dash.set_page_index(page),
        None => dash.search(),
    };
    if !started {
        eprintln!("Error: select a client, database and table before searching (see --list-scopes).");
        dash.dispose();
        return Ok(false);
    }
    ok &= settle(&mut dash, budget);

    if ok {
        match cli.detail {
            Some(ref id) => ok = print_detail(&dash, id)?,
            None => print_page(&dash, cli.format)?,
        }
    }
    dash.dispose();
    Ok(ok)
}

/// Wait for outstanding calls and report any notices. Returns false if
/// anything failed or timed out.
fn settle(dash: &mut Dashboard, budget: Duration) -> bool {
    let settled = dash.settle(budget);
    if !settled {
        eprintln!("Error: the log API did not answer within {}s.", budget.as_secs());
    }
    let notices = dash.take_notices();
    for notice in &notices {
        eprintln!("Error: {}", describe(notice));
    }
    settled && notices.is_empty()
}

fn describe(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::ScopeLookupFailed(level) => {
            format!("could not list {}: {}", level.label(), notice.message)
        }
        NoticeKind::SearchFailed => format!("search failed: {}", notice.message),
    }
}

fn print_scopes(dash: &Dashboard) {
    let state = dash.state();
    let scope = state.scope();
    let options = state.options();
    let rows = [
        ("clients", &options.clients, &scope.client),
        ("databases", &options.databases, &scope.database),
        ("tables", &options.tables, &scope.table),
    ];
    for (label, items, selected) in rows {
        println!("{label}:");
        for item in items {
            let marker = if selected.as_deref() == Some(item.as_str()) { '*' } else { ' ' };
            println!("  {marker} {item}");
        }
    }
}

fn print_page(dash: &Dashboard, format: OutputFormat) -> util::error::Result<()> {
    let state = dash.state();
    let out = io::stdout().lock();
    match format {
        OutputFormat::Csv => {
            export::export_csv(state.data(), out)?;
        }
        OutputFormat::Json => {
            export::export_json(state.data(), out)?;
        }
        OutputFormat::Table => {
            let page = state.filters().page();
            export::export_table(state.data(), page.page_index, state.total(), out)?;
        }
    }
    Ok(())
}

/// Returns false when `id` is not on the fetched page.
fn print_detail(dash: &Dashboard, id: &str) -> util::error::Result<bool> {
    match dash.state().data().iter().find(|e| e.id == id) {
        Some(entry) => {
            export::export_detail(entry, io::stdout().lock())?;
            Ok(true)
        }
        None => {
            eprintln!("Error: no entry with ID '{id}' on this page.");
            Ok(false)
        }
    }
}
