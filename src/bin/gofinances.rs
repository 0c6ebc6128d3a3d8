//! CLI binary for recording and summarizing personal finances.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use gofinances_rs::error::FinanceError;
use gofinances_rs::ledger::LedgerBlocking;
use gofinances_rs::locale::Locale;
use gofinances_rs::models::{
    CategoryKey, CategoryTable, NewTransaction, Polarity, ReferenceMonth, User, UserId,
};
use gofinances_rs::session::SessionBlocking;
use gofinances_rs::storage::{BlockingKeyValueStore, FileStorage};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

/// Environment variable selecting the display locale.
const LOCALE_ENV: &str = "GOFINANCES_LOCALE";

/// Personal finance tracker: record income and outcome, see where the
/// money goes.
#[derive(Debug, Parser)]
#[command(name = "gofinances", version, about)]
struct Cli {
    /// Override the storage directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Display locale: pt-BR or en-US (default: $GOFINANCES_LOCALE, then pt-BR).
    #[arg(long, global = true, value_name = "ID", value_parser = parse_locale)]
    locale: Option<Locale>,
    /// JSON file with a custom category table.
    #[arg(long, global = true, value_name = "FILE")]
    categories: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Remember the profile returned by the identity provider.
    SignIn(SignInArgs),
    /// Forget the signed-in user (transactions are kept).
    SignOut,
    /// Show the signed-in user.
    Whoami,
    /// List the category table.
    Categories,
    /// Register a transaction.
    Add(AddArgs),
    /// List every transaction.
    List,
    /// Show the income, outcome and total cards.
    Highlights,
    /// Show the outcome per category for a month.
    Summary {
        /// Month to summarize (YYYY-MM, default: current month).
        #[arg(long, value_parser = parse_month)]
        month: Option<ReferenceMonth>,
    },
}

/// Arguments for the `sign-in` subcommand.
#[derive(Debug, Args)]
struct SignInArgs {
    /// Identifier assigned by the identity provider.
    #[arg(long)]
    id: String,
    /// Display name.
    #[arg(long)]
    name: String,
    /// E-mail address.
    #[arg(long)]
    email: String,
    /// Avatar URL.
    #[arg(long)]
    photo: Option<String>,
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// Free-text label.
    #[arg(long)]
    name: String,
    /// Positive amount (`12.50` or `12,50`).
    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
    amount: Decimal,
    /// Whether money came in or went out.
    #[arg(long = "type", value_enum)]
    kind: Kind,
    /// Category key (see `gofinances categories`).
    #[arg(long)]
    category: String,
}

/// Transaction type as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    /// Money received.
    Income,
    /// Money spent.
    Outcome,
}

impl From<Kind> for Polarity {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Income => Self::Incoming,
            Kind::Outcome => Self::Outgoing,
        }
    }
}

/// Display settings resolved from flags and environment.
#[derive(Debug)]
struct Settings {
    /// Display locale.
    locale: Locale,
    /// Category table for validation and summaries.
    categories: CategoryTable,
}

/// Parses a locale identifier for clap.
fn parse_locale(s: &str) -> Result<Locale, String> {
    s.parse().map_err(|err: FinanceError| err.to_string())
}

/// Parses a `YYYY-MM` month for clap.
fn parse_month(s: &str) -> Result<ReferenceMonth, String> {
    s.parse().map_err(|err: FinanceError| err.to_string())
}

/// Parses an amount for clap, accepting a decimal comma.
fn parse_amount(s: &str) -> Result<Decimal, String> {
    let normalized = s.trim().replace(',', ".");
    normalized
        .parse()
        .map_err(|err: rust_decimal::Error| format!("invalid amount `{s}`: {err}"))
}

/// Picks the locale from the flag, then the environment, then the default.
fn resolve_locale(flag: Option<Locale>, env: Option<String>) -> Result<Locale, FinanceError> {
    if let Some(locale) = flag {
        return Ok(locale);
    }
    match env {
        Some(value) if !value.trim().is_empty() => value.parse(),
        _ => Ok(Locale::default()),
    }
}

/// Loads a custom category table, or the built-in one when no file is given.
fn load_categories(path: Option<&Path>) -> Result<CategoryTable, FinanceError> {
    let Some(path) = path else {
        return Ok(CategoryTable::default());
    };
    let json = fs::read_to_string(path).map_err(|err| FinanceError::Storage(Box::new(err)))?;
    CategoryTable::from_json(&json)
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> gofinances_rs::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Prints `error: {message}` to stderr and returns a failure code.
fn fail<M: core::fmt::Display>(message: M) -> io::Result<ExitCode> {
    writeln!(io::stderr().lock(), "{} {message}", "error:".red().bold())?;
    Ok(ExitCode::FAILURE)
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let locale = match resolve_locale(cli.locale, std::env::var(LOCALE_ENV).ok()) {
        Ok(locale) => locale,
        Err(err) => return fail(format_args!("{LOCALE_ENV}: {err}")),
    };
    let categories = match load_categories(cli.categories.as_deref()) {
        Ok(categories) => categories,
        Err(err) => return fail(format_args!("failed to load categories: {err}")),
    };
    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => return fail(format_args!("failed to initialize storage: {err}")),
    };

    dispatch(storage, Settings { locale, categories }, cli.command)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingKeyValueStore>(
    storage: S,
    settings: Settings,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        Command::SignIn(args) => cmd_sign_in(&storage, args),
        Command::SignOut => cmd_sign_out(&storage),
        Command::Whoami => cmd_whoami(&storage),
        Command::Categories => cmd_categories(&settings.categories),
        Command::Add(args) => {
            let Some(ledger) = open_ledger(storage, settings)? else {
                return Ok(ExitCode::FAILURE);
            };
            cmd_add(&ledger, args)
        }
        Command::List => {
            let Some(ledger) = open_ledger(storage, settings)? else {
                return Ok(ExitCode::FAILURE);
            };
            cmd_list(&ledger)
        }
        Command::Highlights => {
            let Some(ledger) = open_ledger(storage, settings)? else {
                return Ok(ExitCode::FAILURE);
            };
            cmd_highlights(&ledger)
        }
        Command::Summary { month } => {
            let Some(ledger) = open_ledger(storage, settings)? else {
                return Ok(ExitCode::FAILURE);
            };
            cmd_summary(&ledger, month.unwrap_or_else(ReferenceMonth::current))
        }
    }
}

/// Builds the ledger of the signed-in user.
///
/// Returns `Ok(None)` if nobody is signed in or the ledger cannot be
/// built (error already printed), or `Err` on I/O failure.
fn open_ledger<S: BlockingKeyValueStore>(
    storage: S,
    settings: Settings,
) -> io::Result<Option<LedgerBlocking<S>>> {
    let user = match SessionBlocking::new(&storage).current_user() {
        Ok(Some(user)) => user,
        Ok(None) => {
            let _code = fail(FinanceError::NotSignedIn)?;
            writeln!(
                io::stderr().lock(),
                "  {} run `gofinances sign-in` first",
                "hint:".cyan()
            )?;
            return Ok(None);
        }
        Err(err) => {
            let _code = fail(format_args!("failed to read session: {err}"))?;
            return Ok(None);
        }
    };
    match LedgerBlocking::builder()
        .storage(storage)
        .user(user)
        .categories(settings.categories)
        .locale(settings.locale)
        .build()
    {
        Ok(ledger) => Ok(Some(ledger)),
        Err(err) => {
            let _code = fail(format_args!("failed to open ledger: {err}"))?;
            Ok(None)
        }
    }
}

/// Executes the `sign-in` subcommand.
fn cmd_sign_in<S: BlockingKeyValueStore>(storage: &S, args: SignInArgs) -> io::Result<ExitCode> {
    let user = User {
        id: UserId::new(args.id),
        name: args.name,
        email: args.email,
        photo: args.photo,
    };
    match SessionBlocking::new(storage).sign_in(&user) {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Signed in as".green().bold(),
                user.name
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail(format_args!("sign-in failed: {err}")),
    }
}

/// Executes the `sign-out` subcommand.
fn cmd_sign_out<S: BlockingKeyValueStore>(storage: &S) -> io::Result<ExitCode> {
    match SessionBlocking::new(storage).sign_out() {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{}", "Signed out".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail(format_args!("sign-out failed: {err}")),
    }
}

/// Executes the `whoami` subcommand.
fn cmd_whoami<S: BlockingKeyValueStore>(storage: &S) -> io::Result<ExitCode> {
    match SessionBlocking::new(storage).current_user() {
        Ok(Some(user)) => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", user.name.green().bold())?;
            writeln!(out, "  {} {}", "E-mail:".bold(), user.email)?;
            writeln!(out, "  {} {}", "Id:".bold(), user.id)?;
            if let Some(photo) = user.photo.as_deref() {
                writeln!(out, "  {} {photo}", "Photo:".bold())?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            writeln!(io::stdout().lock(), "{}", "Not signed in.".dimmed())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail(format_args!("failed to read session: {err}")),
    }
}

/// Executes the `categories` subcommand.
fn cmd_categories(categories: &CategoryTable) -> io::Result<ExitCode> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Key").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Color").fg(Color::Cyan),
        Cell::new("Icon").fg(Color::Cyan),
    ]);
    for category in categories {
        let swatch = hex_color(&category.color)
            .map_or_else(|| Cell::new(&category.color), |color| Cell::new(&category.color).fg(color));
        _ = table.add_row(vec![
            Cell::new(&category.key),
            Cell::new(&category.name),
            swatch,
            Cell::new(&category.icon),
        ]);
    }

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        "Categories".green().bold(),
        format_args!("({})", categories.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `add` subcommand.
fn cmd_add<S: BlockingKeyValueStore>(
    ledger: &LedgerBlocking<S>,
    args: AddArgs,
) -> io::Result<ExitCode> {
    let form = NewTransaction::new(
        args.name,
        args.amount,
        Polarity::from(args.kind),
        CategoryKey::new(args.category),
    );
    match ledger.register(form) {
        Ok(tx) => {
            let amount = ledger.locale().format_currency(tx.amount.value());
            writeln!(
                io::stdout().lock(),
                "{} {} {}",
                "Registered".green().bold(),
                tx.name,
                format_args!("({amount})").dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail(format_args!("failed to register transaction: {err}")),
    }
}

/// Executes the `list` subcommand.
fn cmd_list<S: BlockingKeyValueStore>(ledger: &LedgerBlocking<S>) -> io::Result<ExitCode> {
    let rows = match ledger.listing() {
        Ok(rows) => rows,
        Err(err) => return fail(format_args!("failed to read transactions: {err}")),
    };

    let mut out = io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "{}", ledger.locale().no_transactions().dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);
    for row in &rows {
        let category = ledger
            .categories()
            .get(&row.category)
            .map_or_else(|| row.category.to_string(), |category| category.name.clone());
        let amount = if row.polarity.is_outgoing() {
            Cell::new(format!("- {}", row.formatted_amount)).fg(Color::Red)
        } else {
            Cell::new(&row.formatted_amount).fg(Color::Green)
        };
        _ = table.add_row(vec![
            Cell::new(&row.date),
            Cell::new(&row.name),
            Cell::new(category),
            amount,
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("({})", rows.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `highlights` subcommand.
fn cmd_highlights<S: BlockingKeyValueStore>(ledger: &LedgerBlocking<S>) -> io::Result<ExitCode> {
    let summary = match ledger.highlights() {
        Ok(summary) => summary,
        Err(err) => return fail(format_args!("failed to compute highlights: {err}")),
    };
    let locale = ledger.locale();

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Card").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Caption").fg(Color::Cyan),
    ]);
    _ = table.add_row(vec![
        Cell::new("Income"),
        Cell::new(&summary.incoming.formatted_total).fg(Color::Green),
        Cell::new(locale.last_transaction_caption(Polarity::Incoming, &summary.incoming)),
    ]);
    _ = table.add_row(vec![
        Cell::new("Outcome"),
        Cell::new(&summary.outgoing.formatted_total).fg(Color::Red),
        Cell::new(locale.last_transaction_caption(Polarity::Outgoing, &summary.outgoing)),
    ]);
    let net_color = if summary.net.total.is_sign_negative() && !summary.net.total.is_zero() {
        Color::Red
    } else {
        Color::Green
    };
    _ = table.add_row(vec![
        Cell::new("Total"),
        Cell::new(&summary.net.formatted_total).fg(net_color),
        Cell::new(&summary.net.label),
    ]);

    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Highlights".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `summary` subcommand.
fn cmd_summary<S: BlockingKeyValueStore>(
    ledger: &LedgerBlocking<S>,
    month: ReferenceMonth,
) -> io::Result<ExitCode> {
    let breakdown = match ledger.category_breakdown(month) {
        Ok(breakdown) => breakdown,
        Err(err) => return fail(format_args!("failed to compute summary: {err}")),
    };
    let caption = ledger.locale().month_caption(month);

    let mut out = io::stdout().lock();
    if breakdown.is_empty() {
        writeln!(
            out,
            "{} {}",
            caption.bold(),
            ledger.locale().no_transactions().dimmed()
        )?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Total").fg(Color::Cyan),
        Cell::new("Share").fg(Color::Cyan),
    ]);
    for entry in &breakdown {
        let name = hex_color(&entry.color)
            .map_or_else(|| Cell::new(&entry.name), |color| Cell::new(&entry.name).fg(color));
        _ = table.add_row(vec![
            name,
            Cell::new(&entry.formatted_total),
            Cell::new(entry.percent_label()),
        ]);
    }

    writeln!(out, "{}", caption.green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Converts a `#rrggbb` category color into a terminal color.
fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let [_, r, g, b] = value.to_be_bytes();
    Some(Color::Rgb { r, g, b })
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output; if stderr itself failed there is
            // nothing left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
