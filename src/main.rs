// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use budget_tracker::{
    calendar::MonthCursor, export::EXPORT_FILE_NAME, SqliteStore, Theme, Tracker, TransactionType,
};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "budget-tracker")]
#[command(about = "Personal income/expense ledger with category budgets and a spending calendar")]
#[command(version = budget_tracker::VERSION)]
struct Cli {
    /// Path to the SQLite file holding all tracker state
    #[arg(long, global = true, env = "BUDGET_TRACKER_DB", default_value = "budget-tracker.db")]
    db: PathBuf,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a transaction (dated now)
    Add {
        description: String,
        amount: f64,
        #[arg(short, long)]
        category: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
    },
    /// Delete a transaction by id
    Delete { id: i64 },
    /// Show recent transactions
    List {
        /// Show every transaction instead of the last three
        #[arg(long)]
        all: bool,
    },
    /// Income, expense and balance over the whole ledger
    Summary,
    /// Budget utilization for a month (default: current)
    Alerts {
        #[arg(long, value_parser = parse_month)]
        month: Option<MonthCursor>,
    },
    /// Set the monthly limit for a category
    Budget { category: String, amount: f64 },
    /// Manage the category list
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Month grid with per-day expense totals
    Calendar {
        #[arg(long, value_parser = parse_month)]
        month: Option<MonthCursor>,
    },
    /// Expenses recorded on one day
    Day {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Set the calendar thresholds (0 < low < medium)
    Limits { low: f64, medium: f64 },
    /// Set the currency symbol used for display
    Currency { symbol: String },
    /// Show or change the theme: light, dark or toggle
    Theme { value: Option<String> },
    /// Write all transactions as CSV
    Export {
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Clear transactions and budgets, restore default categories
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Interactive dashboard (default)
    Ui,
}

#[derive(Subcommand)]
enum CategoryAction {
    Add { name: String },
    Remove { name: String },
    List,
}

fn parse_month(s: &str) -> Result<MonthCursor, String> {
    MonthCursor::parse(s).ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "budget_tracker=warn",
        1 => "budget_tracker=info",
        _ => "budget_tracker=debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // Load .env before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("failed to open database at {}", cli.db.display()))?;
    let mut tracker = Tracker::open(store)
        .with_context(|| format!("failed to load tracker state from {}", cli.db.display()))?;

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Add { description, amount, category, kind } => {
            let tx = tracker.add_transaction(&description, amount, &category, kind)?;
            println!("✓ Added #{} {} {} ({})", tx.id, tx.kind, money(&tracker, tx.amount), tx.category);
        }
        Commands::Delete { id } => match tracker.remove_transaction(id)? {
            Some(tx) => println!("✓ Deleted #{} {}", tx.id, tx.description),
            None => println!("⚠️  No transaction with id {}", id),
        },
        Commands::List { all } => run_list(&tracker, all),
        Commands::Summary => run_summary(&tracker),
        Commands::Alerts { month } => run_alerts(&tracker, month.unwrap_or_else(this_month)),
        Commands::Budget { category, amount } => {
            tracker.set_budget(&category, amount)?;
            println!("✓ Budget for {} set to {}", category.trim(), money(&tracker, amount));
        }
        Commands::Category { action } => match action {
            CategoryAction::Add { name } => {
                let name = tracker.add_category(&name)?;
                println!("✓ Category added: {}", name);
            }
            CategoryAction::Remove { name } => {
                tracker.remove_category(&name)?;
                println!("✓ Category removed: {} (transactions unchanged)", name.trim());
            }
            CategoryAction::List => {
                for name in tracker.categories() {
                    match tracker.budget_for(name) {
                        Some(limit) => println!("  {:<16} budget {}", name, money(&tracker, limit)),
                        None => println!("  {}", name),
                    }
                }
            }
        },
        Commands::Calendar { month } => run_calendar(&tracker, month.unwrap_or_else(this_month)),
        Commands::Day { date } => run_day(&tracker, date),
        Commands::Limits { low, medium } => {
            tracker.set_calendar_limits(low, medium)?;
            println!("✓ Calendar limits: low ≤ {}, medium ≤ {}", low, medium);
        }
        Commands::Currency { symbol } => {
            tracker.set_currency(&symbol)?;
            println!("✓ Currency: {}", tracker.settings().currency);
        }
        Commands::Theme { value } => {
            let theme = match value.as_deref() {
                None => tracker.settings().theme,
                Some("toggle") => tracker.toggle_theme()?,
                Some(other) => {
                    let theme: Theme = other.parse().map_err(anyhow::Error::msg)?;
                    tracker.set_theme(theme)?;
                    theme
                }
            };
            println!("Theme: {}", theme.as_str());
        }
        Commands::Export { output } => {
            let file = File::create(&output)
                .with_context(|| format!("failed to create {}", output.display()))?;
            tracker.export_csv(BufWriter::new(file))?;
            println!("✓ Exported {} transactions to {}", tracker.transactions().len(), output.display());
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("reset deletes all transactions and budgets; pass --yes to confirm");
            }
            tracker.reset()?;
            println!("✓ Transactions, budgets and categories reset");
        }
        Commands::Ui => run_ui_mode(tracker)?,
    }

    Ok(())
}

fn this_month() -> MonthCursor {
    MonthCursor::of(Local::now().date_naive())
}

fn money(tracker: &Tracker<SqliteStore>, amount: f64) -> String {
    tracker.settings().format_amount(amount)
}

fn run_list(tracker: &Tracker<SqliteStore>, all: bool) {
    let limit = if all { tracker.transactions().len() } else { 3 };
    let recent = tracker.recent(limit);

    if recent.is_empty() {
        println!("No transactions yet");
        return;
    }

    for tx in recent {
        let sign = if tx.is_income() { "+" } else { "-" };
        println!(
            "  #{:<14} {}  {:<24} {:<14} {}{}",
            tx.id,
            tx.local_date().format("%Y-%m-%d"),
            tx.description,
            tx.category,
            sign,
            money(tracker, tx.amount)
        );
    }
}

fn run_summary(tracker: &Tracker<SqliteStore>) {
    let totals = tracker.totals();

    println!("💰 Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Income:   {}", money(tracker, totals.income));
    println!("  Expenses: {}", money(tracker, totals.expense));
    println!("  Balance:  {}", money(tracker, totals.balance));

    let by_category = tracker.expense_by_category();
    if !by_category.is_empty() {
        println!("\n📊 Spending by category");
        for (category, total) in &by_category {
            println!("  {:<16} {}", category, money(tracker, *total));
        }
    }
}

fn run_alerts(tracker: &Tracker<SqliteStore>, month: MonthCursor) {
    let alerts = tracker.budget_alerts(month.year, month.month);

    println!("🔔 Budget alerts for {}", month.title());
    if alerts.is_empty() {
        println!("  Set budgets to get smart alerts");
        return;
    }

    for alert in alerts {
        let icon = match alert.level {
            budget_tracker::AlertLevel::OnTrack => "✅",
            budget_tracker::AlertLevel::NearLimit => "⚠️ ",
            budget_tracker::AlertLevel::Exceeded => "❌",
        };
        println!(
            "  {} {:<16} {:<16} {} / {} ({:.0}%)",
            icon,
            alert.usage.category,
            alert.level.label(),
            money(tracker, alert.usage.spent),
            money(tracker, alert.usage.limit),
            alert.percent()
        );
    }
}

fn run_calendar(tracker: &Tracker<SqliteStore>, month: MonthCursor) {
    let grid = tracker.calendar_month(month);
    let today = Local::now().date_naive();

    println!("📅 {}", month.title());
    println!("   Mon    Tue    Wed    Thu    Fri    Sat    Sun");

    for week in grid.weeks() {
        let mut line = String::new();
        for cell in week {
            match cell {
                Some(day) => {
                    let is_today = MonthCursor::of(today) == month && today.day() == day.day;
                    let marker = match day.tier {
                        budget_tracker::SpendTier::None => ' ',
                        budget_tracker::SpendTier::Low => '.',
                        budget_tracker::SpendTier::Medium => '+',
                        budget_tracker::SpendTier::High => '!',
                    };
                    let open = if is_today { '[' } else { ' ' };
                    let close = if is_today { ']' } else { ' ' };
                    line.push_str(&format!(" {}{:>2}{}{} ", open, day.day, marker, close));
                }
                None => line.push_str("       "),
            }
        }
        println!("{}", line.trim_end());
    }

    let limits = tracker.calendar_limits();
    println!(
        "\n  . ≤ {}   + ≤ {}   ! > {}",
        money(tracker, limits.low),
        money(tracker, limits.medium),
        money(tracker, limits.medium)
    );
}

fn run_day(tracker: &Tracker<SqliteStore>, date: NaiveDate) {
    let details = tracker.day_details(date);

    println!("📅 {}", date.format("%a %b %d %Y"));
    if details.expenses.is_empty() {
        println!("  No expenses recorded");
        return;
    }

    for tx in &details.expenses {
        println!("  {:<24} {:<14} {}", tx.description, tx.category, money(tracker, tx.amount));
    }
    println!(
        "  Total: {} ({})",
        money(tracker, details.total),
        tracker.calendar_limits().tier(details.total).label()
    );
}

#[cfg(feature = "tui")]
fn run_ui_mode(tracker: Tracker<SqliteStore>) -> Result<()> {
    let mut app = ui::App::new(tracker);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_tracker: Tracker<SqliteStore>) -> Result<()> {
    eprintln!("❌ TUI feature not enabled!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
