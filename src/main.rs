//! Simulated options trading terminal.
//!
//! # Usage
//!
//! ```bash
//! # Run the terminal on the bundled sample chain
//! backtrade-terminal run
//!
//! # Run against a chain CSV with a session script
//! backtrade-terminal run --data data/chain.csv --script session.txt
//!
//! # Validate a chain data file
//! backtrade-terminal validate --data data/chain.csv
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::warn;

use backtrade_terminal::chain::first_seen_expirations;
use backtrade_terminal::data::{load_rows, sample_rows, underlyings, OptionSide};
use backtrade_terminal::portfolio::{
    MarginSummary, OrderBlotter, PortfolioTab, PortfolioView, PositionBook, StatusFilter,
};
use backtrade_terminal::ports::{FixtureQuoteSource, RecordingNotifier};
use backtrade_terminal::selection::{OrderAction, SelectionKey};
use backtrade_terminal::session::{TerminalConfig, TerminalSession};
use backtrade_terminal::ticket::{OrderKind, EMPTY_TICKET_MESSAGE};

const SEPARATOR: &str = "============================================================";

/// Simulated trading terminal CLI.
#[derive(Parser)]
#[command(name = "backtrade-terminal")]
#[command(about = "Simulated options trading terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive or scripted terminal session
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "config/terminal.json")]
        config: PathBuf,

        /// Path to a chain CSV (bundled sample chain when omitted)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Path to a session script (reads stdin when omitted)
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Validate a chain data file
    Validate {
        /// Path to a chain CSV
        #[arg(short, long)]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("backtrade_terminal=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            script,
        } => cmd_run(config, data, script),
        Commands::Validate { data } => cmd_validate(data),
    }
}

fn cmd_run(config_path: PathBuf, data: Option<PathBuf>, script: Option<PathBuf>) -> Result<()> {
    let config = TerminalConfig::load_or_default(&config_path);

    let rows = match &data {
        Some(path) => load_rows(path)
            .with_context(|| format!("Could not load chain data from {}", path.display()))?,
        None => sample_rows().context("Could not parse bundled sample chain")?,
    };

    let source = FixtureQuoteSource::new(rows);
    let book = PositionBook::sample();
    let mut shell = Shell {
        portfolio: PortfolioView::new(&book),
        session: TerminalSession::new(config, &source),
        blotter: OrderBlotter::new(),
        notifier: RecordingNotifier::new(),
        book,
    };

    println!("{}", SEPARATOR);
    println!("Backtrade Terminal");
    println!("{}", SEPARATOR);
    shell.print_chain();

    match script {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Could not read script {}", path.display()))?;
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                println!("> {}", line);
                if !shell.execute(line) {
                    break;
                }
            }
        }
        None => {
            println!("\nType 'help' for commands.");
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if !shell.execute(line) {
                    break;
                }
            }
        }
    }

    // Persist the playback speed the user ended on
    if let Err(e) = shell.session.config().save(&config_path) {
        warn!("Could not save config {}: {}", config_path.display(), e);
    }

    Ok(())
}

fn cmd_validate(data: PathBuf) -> Result<()> {
    let rows = load_rows(&data)
        .with_context(|| format!("Could not load chain data from {}", data.display()))?;

    println!("{}", SEPARATOR);
    println!("Chain data: {}", data.display());
    println!("{}", SEPARATOR);
    println!("  Rows: {}", rows.len());

    for symbol in underlyings(&rows) {
        let symbol_rows: Vec<_> = rows.iter().filter(|r| r.symbol == symbol).collect();
        let expirations = first_seen_expirations(&rows, &symbol);
        let min_strike = symbol_rows.iter().map(|r| r.strike).min().unwrap_or_default();
        let max_strike = symbol_rows.iter().map(|r| r.strike).max().unwrap_or_default();

        println!("\n{}:", symbol);
        println!("  Rows: {}", symbol_rows.len());
        println!("  Strikes: {} to {}", min_strike, max_strike);
        println!("  Expirations ({}):", expirations.len());
        for expiration in &expirations {
            let count = symbol_rows
                .iter()
                .filter(|r| r.expiration == *expiration)
                .count();
            println!("    {} ({} rows)", expiration, count);
        }
    }

    println!("\nOK");
    Ok(())
}

/// Interactive shell state: one session plus its collaborators.
struct Shell {
    session: TerminalSession,
    blotter: OrderBlotter,
    notifier: RecordingNotifier,
    book: PositionBook,
    portfolio: PortfolioView,
}

impl Shell {
    /// Run one command line. Returns false when the shell should exit.
    fn execute(&mut self, line: &str) -> bool {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match self.dispatch(&parts) {
            Ok(keep_going) => {
                self.echo_highlight_changes();
                keep_going
            }
            Err(e) => {
                println!("Error: {:#}", e);
                true
            }
        }
    }

    fn dispatch(&mut self, parts: &[&str]) -> Result<bool> {
        match parts {
            ["quit"] | ["exit"] => return Ok(false),
            ["help"] => print_help(),
            ["chain"] => self.print_chain(),
            ["tabs"] => self.print_tabs(),
            ["symbols"] => println!("Symbols: {}", self.session.config().symbols.join(", ")),
            ["symbol", symbol] => {
                let symbol = symbol.to_uppercase();
                self.session.select_underlying(&symbol, &mut self.notifier);
                self.print_chain();
            }
            ["tab", index] => {
                let index: usize = index.parse().context("Invalid tab index")?;
                self.session.select_tab(index);
                self.print_chain();
            }
            ["click", expiration, strike, side] => {
                let key = parse_key(expiration, strike, side)?;
                let change = self.session.click_cell(key.expiration, key.strike, key.side)?;
                println!("{:?}: {}", change, key);
            }
            ["ticket"] => self.print_ticket(),
            ["qty", expiration, strike, side, raw] => {
                let key = parse_key(expiration, strike, side)?;
                self.session.edit_quantity(key, raw)?;
                self.print_ticket();
            }
            ["action", expiration, strike, side, action] => {
                let key = parse_key(expiration, strike, side)?;
                let action = OrderAction::from_str(action).context("Invalid action (buy or sell)")?;
                self.session.set_action(key, action)?;
                self.print_ticket();
            }
            ["delete", expiration, strike, side] => {
                let key = parse_key(expiration, strike, side)?;
                self.session.delete_leg(key, &mut self.notifier);
                self.print_ticket();
            }
            ["kind", kind] => {
                let kind = OrderKind::from_str(kind).context("Invalid kind (market or limit)")?;
                self.session.set_order_kind(kind);
            }
            ["limit", price] => {
                let price: Decimal = price.parse().context("Invalid limit price")?;
                self.session.set_limit_price(price);
            }
            ["submit"] => {
                if self.session.submit(&mut self.blotter, &mut self.notifier) {
                    println!("Order placed ({} total records)", self.blotter.len());
                } else {
                    println!("Nothing to submit");
                }
            }
            ["cancel"] => {
                self.session.cancel(&mut self.notifier);
                println!("Ticket cleared");
            }
            ["portfolio"] => {
                self.portfolio.set_tab(PortfolioTab::Positions);
                self.print_portfolio();
            }
            ["expand", expiration] => {
                let expiration = parse_date(expiration)?;
                self.portfolio.toggle_group(expiration);
                self.print_portfolio();
            }
            ["orders"] => {
                self.portfolio.set_tab(PortfolioTab::Orders);
                self.print_orders();
            }
            ["orders", filter] => {
                let filter = StatusFilter::from_str(filter)
                    .context("Invalid filter (all, pending, filled, canceled)")?;
                self.portfolio.set_tab(PortfolioTab::Orders);
                self.portfolio.set_status_filter(filter);
                self.print_orders();
            }
            ["play"] => self.session.playback_mut().play(),
            ["pause"] => self.session.playback_mut().pause(),
            ["step"] => self.session.playback_mut().step_forward(),
            ["back"] => self.session.playback_mut().step_back(),
            ["jump"] => self.session.playback_mut().jump_forward(),
            ["jumpback"] => self.session.playback_mut().jump_back(),
            ["seek", position] => {
                let position: u32 = position.parse().context("Invalid position")?;
                self.session.playback_mut().seek(position);
            }
            ["speed", speed] => {
                let speed: u32 = speed.parse().context("Invalid speed")?;
                self.session.set_playback_speed(speed);
            }
            ["finish"] => {
                self.session.finish_simulation();
                println!("Simulation finished");
            }
            ["restart"] => {
                self.session.restart_simulation();
                println!("Simulation restarted");
                self.print_chain();
            }
            ["reset"] => {
                self.session.reset();
                println!("Reset (generation {})", self.session.reset_generation());
            }
            ["status"] => self.print_status(),
            _ => println!("Unknown command. Type 'help' for commands."),
        }
        Ok(true)
    }

    fn echo_highlight_changes(&mut self) {
        for key in self.notifier.take() {
            println!("  Highlight cleared: {}", key);
        }
    }

    fn print_chain(&self) {
        println!("\nChain: {}", self.session.chain().underlying());
        self.print_tabs();

        let rows = self.session.visible_rows();
        if rows.is_empty() {
            println!("  (no rows at this tab)");
            return;
        }

        println!(
            "  {:>1} {:>7} {:>7} {:>7} | {:>8} | {:>1} {:>7} {:>7} {:>7}",
            "", "CallBid", "CallAsk", "Delta", "Strike", "", "PutBid", "PutAsk", "Delta"
        );
        for row in rows {
            let highlights = self.session.row_highlights(row);
            println!(
                "  {:>1} {:>7} {:>7} {:>7.2} | {:>8} | {:>1} {:>7} {:>7} {:>7.2}",
                mark(highlights.call),
                row.call.bid.to_string(),
                row.call.ask.to_string(),
                row.call.greeks.delta,
                row.strike.to_string(),
                mark(highlights.put),
                row.put.bid.to_string(),
                row.put.ask.to_string(),
                row.put.greeks.delta,
            );
        }
    }

    fn print_tabs(&self) {
        let tabs = self.session.expiration_tabs();
        if tabs.is_empty() {
            println!("Tabs: (none)");
            return;
        }
        let active = self.session.chain().active_tab();
        let labels: Vec<String> = tabs
            .iter()
            .enumerate()
            .map(|(i, e)| {
                if i == active {
                    format!("[{}]", e)
                } else {
                    format!(" {} ", e)
                }
            })
            .collect();
        println!("Tabs: {}", labels.join(" "));
    }

    fn print_ticket(&self) {
        println!("\nOrder Entry");
        let entries = self.session.ticket_rows();
        if entries.is_empty() {
            println!("  {}", EMPTY_TICKET_MESSAGE);
            return;
        }

        println!(
            "  {:<6} {:>4} {:>12} {:>8} {:>4} {:>6} {:>6} {:>6} {:>6}",
            "Action", "Qty", "Expiration", "Strike", "Type", "Vega", "Delta", "Gamma", "Theta"
        );
        for entry in entries {
            println!(
                "  {:<6} {:>4} {:>12} {:>8} {:>4} {:>6.2} {:>6.2} {:>6.2} {:>6.2}",
                entry.action.as_str(),
                entry.quantity,
                entry.key.expiration.to_string(),
                entry.key.strike.to_string(),
                entry.key.side.as_str(),
                entry.greeks.vega,
                entry.greeks.delta,
                entry.greeks.gamma,
                entry.greeks.theta,
            );
        }
        let ticket = self.session.ticket();
        match ticket.kind() {
            OrderKind::Limit => println!("  Order type: Limit @ {}", ticket.limit_price()),
            OrderKind::Market => println!("  Order type: Market"),
        }
    }

    fn print_portfolio(&self) {
        let margin = MarginSummary::default();
        println!("\nPortfolio");
        println!(
            "  Net Value: ${}  Excess Liquidity: ${}  Maintenance Margin: ${}",
            margin.net_value, margin.excess_liquidity, margin.maintenance_margin
        );

        for group in self.book.groups() {
            if !self.portfolio.is_expanded(group.expiration) {
                println!("  + {} ({} positions)", group.expiration, group.rows.len());
                continue;
            }
            println!("  - {}", group.expiration);
            println!(
                "    {:>6} {:>6} {:<24} {:>4} {:>9} {:>6} {:>6} {:>6} {:>9} {:>8}",
                "Greeks", "PnL", "Instrument", "Pos", "MktValue", "Delta", "Gamma", "Vega", "AvgPrice", "Last"
            );
            for row in &group.rows {
                println!(
                    "    {:>6.2} {:>6} {:<24} {:>4} {:>9} {:>6.2} {:>6.2} {:>6.2} {:>9} {:>8}",
                    row.aggregated_greeks(),
                    row.daily_pnl.to_string(),
                    row.instrument(),
                    row.position,
                    row.market_value.to_string(),
                    row.delta,
                    row.gamma,
                    row.vega,
                    row.avg_price.to_string(),
                    row.last.to_string(),
                );
            }
        }
        println!("  Total PnL: {}", self.book.total_pnl());
    }

    fn print_orders(&self) {
        println!("\nOrders");
        let records = self.blotter.with_status(self.portfolio.status_filter());
        if records.is_empty() {
            println!("  (no orders)");
            return;
        }
        println!(
            "  {:<24} {:<6} {:>4} {:>8} {:>10} {:>8}",
            "Instrument", "Action", "Qty", "Kind", "LimitPrice", "Status"
        );
        for record in records {
            println!(
                "  {:<24} {:<6} {:>4} {:>8} {:>10} {:>8}",
                record.instrument(),
                record.action.as_str(),
                record.quantity,
                record.kind.as_str(),
                record.limit_price.to_string(),
                record.status.as_str(),
            );
        }
    }

    fn print_status(&self) {
        let playback = self.session.playback();
        println!("Underlying: {}", self.session.chain().underlying());
        println!("Tab: {}", self.session.chain().active_tab());
        println!("Selections: {}", self.session.store().len());
        println!(
            "Playback: {} at {}%, speed {}",
            playback.state().as_str(),
            playback.position(),
            playback.speed()
        );
        println!("Reset generation: {}", self.session.reset_generation());
    }
}

fn mark(highlighted: bool) -> &'static str {
    if highlighted {
        "*"
    } else {
        " "
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").context("Invalid date (expected YYYY-MM-DD)")
}

fn parse_key(expiration: &str, strike: &str, side: &str) -> Result<SelectionKey> {
    let expiration = parse_date(expiration)?;
    let strike: Decimal = strike.parse().context("Invalid strike")?;
    let side = OptionSide::from_str(side).context("Invalid side (C or P)")?;
    Ok(SelectionKey::new(expiration, strike, side))
}

fn print_help() {
    println!("Chain:");
    println!("  chain                                 Show the chain at the active tab");
    println!("  tabs                                  List expiration tabs");
    println!("  tab <index>                           Switch expiration tab");
    println!("  symbols                               List available underlyings");
    println!("  symbol <SYM>                          Switch underlying (clears ticket)");
    println!("  click <expiration> <strike> <C|P>     Toggle a cell selection");
    println!("Ticket:");
    println!("  ticket                                Show the order ticket");
    println!("  qty <expiration> <strike> <C|P> <n>   Set leg quantity");
    println!("  action <expiration> <strike> <C|P> <buy|sell>");
    println!("  delete <expiration> <strike> <C|P>    Remove a leg");
    println!("  kind <market|limit>                   Set order type");
    println!("  limit <price>                         Set limit price");
    println!("  submit                                Place the batch order");
    println!("  cancel                                Clear the ticket");
    println!("Portfolio:");
    println!("  portfolio                             Show positions");
    println!("  expand <expiration>                   Toggle a position group");
    println!("  orders [all|pending|filled|canceled]  Show placed orders");
    println!("Playback:");
    println!("  play | pause | step | back | jump | jumpback");
    println!("  seek <0-100> | speed <1-100> | finish | restart");
    println!("Session:");
    println!("  reset                                 Simulation reset signal");
    println!("  status                                Session summary");
    println!("  help | quit");
}
