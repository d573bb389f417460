use analytics::{AchievementId, AnalyticsEngine, BreakdownField, DayCell};
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use configuration::{load_config, load_config_from, Config, LogFormat, LoggingSettings};
use core_types::{NewTrade, Trade, TradeType};
use risk::{compute_risk_plan, PositionSize, RiskInputs, SizingMode};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use storage::{parse_trades_csv, write_trades_csv, JsonFileRepository, TradeRepository};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

/// The main entry point for the Tradebook journal.
fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    init_tracing(&config.logging, cli.log_format)?;

    let journal = cli.journal.clone().unwrap_or_else(|| config.storage.path.clone());
    let mut repo = JsonFileRepository::open(&journal)
        .with_context(|| format!("Failed to open journal at {}", journal.display()))?;
    let engine = AnalyticsEngine::new(config.analytics.starting_equity);

    // Execute the appropriate command
    match cli.command {
        Commands::List => handle_list(&repo),
        Commands::Add(args) => handle_add(args, &mut repo),
        Commands::Delete(args) => handle_delete(args, &mut repo),
        Commands::Reset => handle_reset(&mut repo),
        Commands::Import(args) => handle_import(args, &mut repo),
        Commands::Export(args) => handle_export(args, &repo),
        Commands::Stats => handle_stats(&repo, &engine),
        Commands::Equity => handle_equity(&repo, &engine),
        Commands::Calendar(args) => handle_calendar(args, &repo, &engine),
        Commands::Breakdown(args) => handle_breakdown(args, &repo, &engine),
        Commands::Insights => handle_insights(&repo, &engine),
        Commands::Achievements => handle_achievements(&repo, &engine),
        Commands::Risk(args) => handle_risk(args, &config),
        Commands::Report(args) => handle_report(args, &repo, &engine),
    }
}

fn init_tracing(settings: &LoggingSettings, format: Option<LogFormat>) -> Result<()> {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Invalid logging.level directive")?;
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format.unwrap_or(settings.format) {
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish())?,
    }
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A personal trading journal with performance analytics and a position-size calculator.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ./config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the journal file, overriding `storage.path`.
    #[arg(long, global = true)]
    journal: Option<PathBuf>,

    /// Log line style, overriding `logging.format`.
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every trade in the journal, newest first.
    List,
    /// Record a closed trade.
    Add(AddArgs),
    /// Remove a trade by id.
    Delete(DeleteArgs),
    /// Replace the journal with the sample trades.
    Reset,
    /// Append trades from a `Date, Symbol, Type, Entry, Exit, Qty` CSV file.
    Import(FileArgs),
    /// Write the journal to a CSV file.
    Export(FileArgs),
    /// Headline performance numbers.
    Stats,
    /// The cumulative equity curve and its maximum drawdown.
    Equity,
    /// Daily PnL heatmap for one month.
    Calendar(PeriodArgs),
    /// Performance grouped by strategy, emotion or asset class.
    Breakdown(BreakdownArgs),
    /// Behavioural feedback derived from the journal.
    Insights,
    /// Milestone badges.
    Achievements,
    /// Size a prospective trade from its stop loss.
    Risk(RiskArgs),
    /// Print the full dashboard as JSON.
    Report(PeriodArgs),
}

#[derive(Parser)]
struct AddArgs {
    /// The instrument traded (e.g., "BTC/USD").
    #[arg(long)]
    symbol: String,

    /// LONG or SHORT.
    #[arg(long = "type", default_value = "LONG")]
    trade_type: TradeType,

    #[arg(long)]
    entry: Decimal,

    #[arg(long)]
    exit: Decimal,

    #[arg(long, default_value = "1")]
    qty: Decimal,

    /// The trade date (format: YYYY-MM-DD). Defaults to now.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    strategy: Option<String>,

    #[arg(long)]
    emotion: Option<String>,

    #[arg(long)]
    asset_class: Option<String>,

    #[arg(long)]
    trend: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Parser)]
struct DeleteArgs {
    id: Uuid,
}

#[derive(Parser)]
struct FileArgs {
    path: PathBuf,
}

#[derive(Parser)]
struct PeriodArgs {
    /// Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,

    /// 1-12. Defaults to the current month.
    #[arg(long)]
    month: Option<u32>,
}

#[derive(Parser)]
struct BreakdownArgs {
    /// strategy, emotion or asset-class.
    #[arg(long)]
    by: BreakdownField,
}

#[derive(Parser)]
struct RiskArgs {
    #[arg(long)]
    entry: Decimal,

    #[arg(long)]
    stop: Decimal,

    /// Defaults to `risk.account_balance`.
    #[arg(long)]
    balance: Option<Decimal>,

    /// Percent of the balance to risk. Defaults to `risk.risk_percent`.
    #[arg(long)]
    risk_percent: Option<Decimal>,

    /// Defaults to `risk.leverage`.
    #[arg(long)]
    leverage: Option<Decimal>,

    /// crypto or forex. Defaults to `risk.mode`.
    #[arg(long)]
    mode: Option<SizingMode>,
}

// ==============================================================================
// Journal Commands
// ==============================================================================

fn handle_list(repo: &impl TradeRepository) -> Result<()> {
    let trades = repo.list_trades()?;
    if trades.is_empty() {
        println!("The journal is empty.");
        return Ok(());
    }

    let mut table = new_table(vec![
        "Date", "Id", "Symbol", "Type", "Entry", "Exit", "Qty", "PnL", "Strategy", "Emotion",
        "Class",
    ]);
    for trade in &trades {
        table.add_row(vec![
            Cell::new(trade.date.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
            Cell::new(trade.id),
            Cell::new(&trade.symbol),
            Cell::new(trade.trade_type),
            Cell::new(trade.entry_price),
            Cell::new(trade.exit_price),
            Cell::new(trade.quantity),
            pnl_cell(trade.pnl),
            Cell::new(trade.strategy.as_deref().unwrap_or("-")),
            Cell::new(trade.emotion.as_deref().unwrap_or("-")),
            Cell::new(trade.asset_class.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_add(args: AddArgs, repo: &mut impl TradeRepository) -> Result<()> {
    let date = args
        .date
        .map_or_else(Utc::now, |d| d.and_time(NaiveTime::MIN).and_utc());
    let trade = Trade::open(NewTrade {
        symbol: args.symbol,
        trade_type: args.trade_type,
        entry_price: args.entry,
        exit_price: args.exit,
        quantity: args.qty,
        date,
        strategy: args.strategy,
        emotion: args.emotion,
        asset_class: args.asset_class,
        market_trend: args.trend,
        notes: args.notes,
    })
    .context("Invalid trade")?;

    let summary = format!(
        "Added {} {} with PnL {} ({}), id {}",
        trade.trade_type,
        trade.symbol,
        signed(trade.pnl),
        trade.status,
        trade.id
    );
    repo.add_trade(trade)?;
    println!("{summary}");
    Ok(())
}

fn handle_delete(args: DeleteArgs, repo: &mut impl TradeRepository) -> Result<()> {
    let removed = repo.delete_trade(args.id)?;
    println!("Deleted {} {} ({})", removed.trade_type, removed.symbol, removed.id);
    Ok(())
}

fn handle_reset(repo: &mut impl TradeRepository) -> Result<()> {
    let fresh = repo.reset()?;
    println!("Journal reset to {} sample trades.", fresh.len());
    Ok(())
}

fn handle_import(args: FileArgs, repo: &mut impl TradeRepository) -> Result<()> {
    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let trades = parse_trades_csv(&text, Utc::now())
        .with_context(|| format!("Failed to import {}", args.path.display()))?;
    let count = repo.add_trades(trades)?;
    println!("Imported {count} trades from {}.", args.path.display());
    Ok(())
}

fn handle_export(args: FileArgs, repo: &impl TradeRepository) -> Result<()> {
    let trades = repo.list_trades()?;
    let file = fs::File::create(&args.path)
        .with_context(|| format!("Failed to create {}", args.path.display()))?;
    write_trades_csv(&trades, file)?;
    println!("Exported {} trades to {}.", trades.len(), args.path.display());
    Ok(())
}

// ==============================================================================
// Analytics Commands
// ==============================================================================

fn handle_stats(repo: &impl TradeRepository, engine: &AnalyticsEngine) -> Result<()> {
    let stats = engine.stats(&repo.list_trades()?);
    let optional =
        |value: Option<Decimal>| value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));

    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total trades"), Cell::new(stats.total_trades)]);
    table.add_row(vec![
        Cell::new("Wins / Losses"),
        Cell::new(format!("{} / {}", stats.wins, stats.losses)),
    ]);
    table.add_row(vec![Cell::new("Win rate"), Cell::new(format!("{:.1}%", stats.win_rate_pct))]);
    table.add_row(vec![Cell::new("Total PnL"), pnl_cell(stats.total_pnl)]);
    table.add_row(vec![Cell::new("Gross profit"), Cell::new(format!("{:.2}", stats.gross_profit))]);
    table.add_row(vec![Cell::new("Gross loss"), Cell::new(format!("{:.2}", stats.gross_loss))]);
    table.add_row(vec![Cell::new("Profit factor"), Cell::new(optional(stats.profit_factor))]);
    table.add_row(vec![Cell::new("Best trade"), Cell::new(optional(stats.best_trade))]);
    table.add_row(vec![Cell::new("Worst trade"), Cell::new(optional(stats.worst_trade))]);
    println!("{table}");
    Ok(())
}

fn handle_equity(repo: &impl TradeRepository, engine: &AnalyticsEngine) -> Result<()> {
    let curve = engine.equity_curve(&repo.list_trades()?);
    let drawdown = analytics::max_drawdown(&curve, engine.starting_equity());

    let mut table = new_table(vec!["Date", "PnL", "Equity"]);
    for point in &curve {
        table.add_row(vec![
            Cell::new(&point.label),
            pnl_cell(point.pnl),
            Cell::new(format!("{:.2}", point.equity)),
        ]);
    }
    println!("{table}");
    println!(
        "Starting equity {:.2}, max drawdown {:.2} ({:.2}%)",
        engine.starting_equity(),
        drawdown.max_drawdown,
        drawdown.max_drawdown_pct
    );
    Ok(())
}

fn handle_calendar(
    args: PeriodArgs,
    repo: &impl TradeRepository,
    engine: &AnalyticsEngine,
) -> Result<()> {
    let (year, month) = resolve_period(&args);
    let cells = engine.calendar(&repo.list_trades()?, year, month)?;

    let mut table = new_table(vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
    for week in cells.chunks(7) {
        table.add_row(week.iter().map(|cell| match cell {
            DayCell::Blank => Cell::new(""),
            DayCell::Day { day, pnl, active: true } => {
                Cell::new(format!("{day}\n{}", signed(*pnl))).fg(pnl_color(*pnl))
            }
            DayCell::Day { day, .. } => Cell::new(day),
        }));
    }
    println!("{year}-{month:02}");
    println!("{table}");
    Ok(())
}

fn handle_breakdown(
    args: BreakdownArgs,
    repo: &impl TradeRepository,
    engine: &AnalyticsEngine,
) -> Result<()> {
    let groups = engine.breakdown(&repo.list_trades()?, args.by);

    let mut table = new_table(vec![args.by.to_string().as_str(), "Trades", "Wins", "PnL"]);
    for group in &groups {
        table.add_row(vec![
            Cell::new(&group.name),
            Cell::new(group.trade_count),
            Cell::new(group.win_count),
            pnl_cell(group.pnl),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_insights(repo: &impl TradeRepository, engine: &AnalyticsEngine) -> Result<()> {
    for insight in engine.insights(&repo.list_trades()?) {
        println!("[{}] {}", insight.category.icon(), insight.title);
        println!("    {}", insight.description);
    }
    Ok(())
}

fn handle_achievements(repo: &impl TradeRepository, engine: &AnalyticsEngine) -> Result<()> {
    let unlocked = engine.achievements(&repo.list_trades()?);

    let mut table = new_table(vec!["", "Badge", "Requirement"]);
    for id in AchievementId::ALL {
        let mark = if unlocked.contains(&id) {
            Cell::new("unlocked").fg(Color::Green)
        } else {
            Cell::new("locked").fg(Color::DarkGrey)
        };
        table.add_row(vec![mark, Cell::new(id.title()), Cell::new(id.description())]);
    }
    println!("{table}");
    println!("{} of {} unlocked", unlocked.len(), AchievementId::ALL.len());
    Ok(())
}

fn handle_report(
    args: PeriodArgs,
    repo: &impl TradeRepository,
    engine: &AnalyticsEngine,
) -> Result<()> {
    let trades = repo.list_trades()?;
    let report = if args.year.is_none() && args.month.is_none() {
        engine.report(&trades)
    } else {
        let (year, month) = resolve_period(&args);
        engine.report_in(&trades, year, month, &Local)?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ==============================================================================
// Risk Calculator
// ==============================================================================

fn handle_risk(args: RiskArgs, config: &Config) -> Result<()> {
    let defaults = &config.risk;
    let inputs = RiskInputs {
        account_balance: args.balance.unwrap_or(defaults.account_balance),
        risk_percent: args.risk_percent.unwrap_or(defaults.risk_percent),
        entry_price: args.entry,
        stop_loss_price: args.stop,
        leverage: args.leverage.unwrap_or(defaults.leverage),
        mode: args.mode.unwrap_or(defaults.mode),
    };
    let plan = compute_risk_plan(&inputs)?;

    let mut table = new_table(vec!["", ""]);
    table.add_row(vec![Cell::new("Bias"), Cell::new(plan.bias)]);
    table.add_row(vec![Cell::new("Risk amount"), Cell::new(format!("{:.2}", plan.risk_amount))]);
    table.add_row(vec![
        Cell::new("Stop distance"),
        Cell::new(format!("{} ({:.2}%)", plan.price_distance, plan.stop_loss_pct)),
    ]);
    match &plan.position {
        PositionSize::Crypto { units, .. } => {
            table.add_row(vec![Cell::new("Position size"), Cell::new(format!("{units:.4} units"))]);
        }
        PositionSize::Forex { pips_risked, lots, .. } => {
            table.add_row(vec![Cell::new("Pips at risk"), Cell::new(format!("{pips_risked:.1}"))]);
            table.add_row(vec![Cell::new("Position size"), Cell::new(format!("{lots:.2} lots"))]);
        }
    }
    table.add_row(vec![
        Cell::new("Notional"),
        Cell::new(format!("{:.2}", plan.position.notional())),
    ]);
    table.add_row(vec![
        Cell::new(format!("Margin ({}x)", inputs.leverage)),
        Cell::new(format!("{:.2}", plan.margin_required)),
    ]);
    table.add_row(vec![
        Cell::new("Liquidation"),
        Cell::new(format!("{:.2}", plan.liquidation_price)).fg(Color::Red),
    ]);
    for target in &plan.targets {
        table.add_row(vec![
            Cell::new(format!("Target {}R", target.multiple)),
            Cell::new(format!("{} (+{:.2})", target.price, target.reward)).fg(Color::Green),
        ]);
    }
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Rendering Helpers
// ==============================================================================

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pnl_color(pnl: Decimal) -> Color {
    if pnl >= Decimal::ZERO {
        Color::Green
    } else {
        Color::Red
    }
}

fn pnl_cell(pnl: Decimal) -> Cell {
    Cell::new(signed(pnl)).fg(pnl_color(pnl))
}

fn signed(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

fn resolve_period(args: &PeriodArgs) -> (i32, u32) {
    let today = Local::now().date_naive();
    (args.year.unwrap_or(today.year()), args.month.unwrap_or(today.month()))
}
