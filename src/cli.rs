//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, DEFAULT_FILE_SUFFIX};
use crate::adapters::csv_export::CsvExporter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{build_backtest_config, read_codes, validate_backtest_config};
use crate::domain::error::PullbackError;
use crate::domain::indicator_set::IndicatorSet;
use crate::domain::metrics::RunSummary;
use crate::domain::series_store::InstrumentSeries;
use crate::domain::universe::{load_universe, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pullback", about = "Trend-pullback strategy backtester")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Comma-separated tickers, replacing [backtest] codes
        #[arg(long)]
        codes: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers with a price file in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for ticker(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            output_dir,
            codes,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(
                    &config,
                    data_dir.as_deref(),
                    output_dir.as_deref(),
                    codes.as_deref(),
                )
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, code } => run_info(&config, code.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PullbackError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: PullbackError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Price file adapter from `[data]`, with an optional directory override.
pub fn data_adapter(config: &dyn ConfigPort, dir_override: Option<&Path>) -> CsvAdapter {
    let dir = dir_override.map(Path::to_path_buf).unwrap_or_else(|| {
        config
            .get_string("data", "directory")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let suffix = config
        .get_string("data", "file_suffix")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_SUFFIX.to_string());
    CsvAdapter::with_suffix(dir, suffix)
}

pub fn output_dir(config: &dyn ConfigPort, dir_override: Option<&Path>) -> PathBuf {
    dir_override.map(Path::to_path_buf).unwrap_or_else(|| {
        config
            .get_string("output", "directory")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// `--codes` when given, otherwise `[backtest] codes`.
pub fn resolve_codes(
    code_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, PullbackError> {
    match code_override {
        Some(raw) => parse_codes(raw).map_err(|e| PullbackError::ConfigInvalid {
            section: "backtest".into(),
            key: "codes".into(),
            reason: e.to_string(),
        }),
        None => read_codes(config),
    }
}

fn run_backtest(
    config_path: &Path,
    data_dir: Option<&Path>,
    output_override: Option<&Path>,
    code_override: Option<&str>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let codes = match resolve_codes(code_override, &adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let data_port = data_adapter(&adapter, data_dir);
    let output = output_dir(&adapter, output_override);

    match run_backtest_pipeline(&data_port, &CsvExporter::new(), &bt_config, &codes, &output) {
        Ok(_) => {
            eprintln!("\nResults written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Load, backtest, print the console summary and export.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    bt_config: &BacktestConfig,
    codes: &[String],
    output_dir: &Path,
) -> Result<RunSummary, PullbackError> {
    eprintln!("Loading {} codes...", codes.len());
    let universe = load_universe(data_port, codes)?;
    for skipped in &universe.skipped {
        eprintln!("warning: skipping {} ({:?})", skipped.code, skipped.reason);
    }

    eprintln!(
        "Running backtest: {} codes, warmup {} bars, max hold {} days",
        universe.store.len(),
        bt_config.indicators.warmup_bars(),
        bt_config.simulation.max_hold_days,
    );
    let result = backtest_engine::run_backtest(&universe.store, bt_config);
    let summary = RunSummary::compute(&result);

    print_summary(&summary);

    report_port.write(&result, output_dir)?;
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\n=== Per-Code Summary ===");
    for s in &summary.instruments {
        eprintln!(
            "  {}:  {} entries, {} trades, {} positions, {} stopped, {:.1}% win rate, avg {:+.2}%, reinvested ${:.2}",
            s.code,
            s.entries,
            s.trades,
            s.positions_taken,
            s.stopped_out,
            s.win_rate * 100.0,
            s.avg_return * 100.0,
            s.reinvested,
        );
        if s.horizon_exhausted > 0 {
            eprintln!("      {} entries on the last bar skipped", s.horizon_exhausted);
        }
    }

    eprintln!("\n=== Aggregate Results ===");
    eprintln!("Total Entries:    {}", summary.total_entries);
    eprintln!("Total Trades:     {}", summary.total_trades);
    eprintln!("Positions Taken:  {}", summary.positions_taken);
    eprintln!("Stop-loss Exits:  {}", summary.stopped_out);
    eprintln!("Win Rate:         {:.1}%", summary.win_rate * 100.0);
    eprintln!("Avg Return:       {:+.2}%", summary.avg_return * 100.0);
    eprintln!("Starting Balance: ${:.2}", summary.starting_balance);
    eprintln!("Total Reinvested: ${:.2}", summary.total_reinvested);
    eprintln!("Final Balance:    ${:.2}", summary.final_balance);
    eprintln!("Total Return:     {:+.2}%", summary.total_return * 100.0);
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    eprintln!("Config validated successfully");

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let codes = match read_codes(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let columns: Vec<String> = IndicatorSet::compute(&[], &bt_config.indicators)
        .all_series()
        .iter()
        .map(|s| s.indicator_type.to_string())
        .collect();

    eprintln!("\nIndicators to compute:");
    for column in &columns {
        eprintln!("  {}", column);
    }
    eprintln!("  warmup: {} bars", bt_config.indicators.warmup_bars());

    eprintln!("\nEntry rule:");
    eprintln!(
        "  EMA {:?} and SMA {:?} stacked, %K <= {}, RSI <= {}, close off the low",
        bt_config.indicators.ema_periods,
        bt_config.indicators.sma_periods,
        bt_config.signal.stochastic_threshold,
        bt_config.signal.rsi_threshold,
    );
    if bt_config.signal.stochastic_threshold >= 1.0 {
        eprintln!("  note: %K is on a 0-1 scale, so the stochastic condition always holds");
    }

    eprintln!("\nSimulation:");
    eprintln!("  starting balance:   {}", bt_config.starting_balance);
    eprintln!("  commission:         {}", bt_config.simulation.commission_rate);
    eprintln!("  drawdown threshold: {}", bt_config.simulation.drawdown_threshold);
    eprintln!("  max hold days:      {}", bt_config.simulation.max_hold_days);

    let data_port = data_adapter(&adapter, None);
    eprintln!("\nUniverse:");
    eprintln!("  codes: {}", codes.join(", "));
    for code in &codes {
        let path = data_port.csv_path(code);
        if !path.exists() {
            eprintln!("  warning: {} not found", path.display());
        }
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_backtest_config(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let adapter = data_adapter(&config, None);
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    if symbols.is_empty() {
        eprintln!("No price files found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, code: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let codes = match resolve_codes(code, &config) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let adapter = data_adapter(&config, None);
    for c in &codes {
        let range = adapter
            .fetch_series(c)
            .and_then(|bars| InstrumentSeries::new(c.as_str(), bars));
        match range.map(|series| series.date_range()) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} bars, {} to {}", c, count, first, last);
            }
            Ok(None) => {
                eprintln!("{}: no data found", c);
            }
            Err(e) => {
                eprintln!("error reading {}: {}", c, e);
            }
        }
    }
    ExitCode::SUCCESS
}
