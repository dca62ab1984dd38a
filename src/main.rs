use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{debug, error, info};

use racewatch::cli::{Cli, Command, DiffArgs, FetchArgs, RunArgs};
use racewatch::config::{Config, LogConfig};
use racewatch::cycle::{self, Outcome};
use racewatch::delimited;
use racewatch::fetch::{HttpTableSource, TableFetcher};
use racewatch::notify::console::ConsoleNotifier;
use racewatch::notify::smtp::SmtpNotifier;
use racewatch::notify::Notifier;
use racewatch::report::{self, ReportOptions};
use racewatch::store::diff::compare_tables;
use racewatch::store::SnapshotStore;
use racewatch::{Error, Result};

/// Initialize tracing based on CLI flags and the [log] section.
fn init_logging(log: &LogConfig, verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        log.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = log.file.as_ref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            Err(e) => {
                eprintln!("warning: cannot open log file {}: {e}", path.display());
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn cmd_run(config: &Config, args: &RunArgs) -> Result<()> {
    info!("[START]");

    let result = run_once(config, args);
    if let Err(e) = &result {
        error!(error = %e, "run failed");
    }

    info!("[END]");
    result
}

fn run_once(config: &Config, args: &RunArgs) -> Result<()> {
    let mut config = config.clone();
    if args.dry_run && config.mail.recipients.is_empty() {
        config.mail.recipients.push("<stdout>".to_string());
    }

    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(ConsoleNotifier::stdout())
    } else {
        Box::new(SmtpNotifier::new(&config.mail)?)
    };

    let result = HttpTableSource::new(&config.source)
        .and_then(|source| cycle::execute(&config, &source, notifier.as_ref(), !args.dry_run));

    match &result {
        Ok(Outcome::NoChange) => info!("no change, nothing to send"),
        Ok(Outcome::Reported(_)) => info!("differences reported"),
        Ok(Outcome::BootstrappedEmpty) => info!("first snapshot created, nothing to compare yet"),
        Err(e) => {
            let delivery = cycle::report_failure(&config, notifier.as_ref(), e);
            if delivery.nothing_delivered() {
                error!("operator could not be notified of the failure");
            }
        }
    }

    result.map(|_| ())
}

fn cmd_fetch(config: &Config, args: &FetchArgs) -> Result<()> {
    let source = HttpTableSource::new(&config.source)?;
    let table = source.fetch_table(&config.columns)?;

    if args.json {
        let json = serde_json::to_string_pretty(&table)?;
        println!("{json}");
    } else {
        print!("{}", delimited::table_to_string(&table, b'\t')?);
    }
    Ok(())
}

fn cmd_diff(config: &Config, args: &DiffArgs) -> Result<()> {
    let store = SnapshotStore::from_config(&config.snapshots);

    // --from and --to go together
    let (from, to) = match (&args.from, &args.to) {
        (Some(from), Some(to)) => (from.clone(), to.clone()),
        (None, None) => {
            let files = store.list()?;
            if files.len() < 2 {
                return Err(Error::Config(format!(
                    "need at least 2 snapshots in {} to compare",
                    store.dir().display()
                )));
            }
            (files[1].path.clone(), files[0].path.clone())
        }
        _ => {
            return Err(Error::Config(
                "both --from and --to must be specified together".to_string(),
            ))
        }
    };

    let prior = store.load(&from)?;
    let current = store.load(&to)?;
    let diff = compare_tables(&current, &prior);

    println!("Comparing snapshots:");
    println!("  From: {}", from.display());
    println!("  To:   {}", to.display());
    println!();

    if args.json {
        let json = serde_json::to_string_pretty(&diff)?;
        println!("{json}");
    } else if diff.is_empty() {
        println!("No changes detected.");
    } else {
        let options = ReportOptions {
            format: args.format.unwrap_or(config.report.format),
            ..config.report.clone()
        };
        print!("{}", report::render(&diff, &options));
    }
    Ok(())
}

fn cmd_list(config: &Config) -> Result<()> {
    let store = SnapshotStore::from_config(&config.snapshots);
    let files = store.list()?;

    if files.is_empty() {
        println!(
            "No snapshots found in {}. Run 'racewatch run' to create one.",
            store.dir().display()
        );
        return Ok(());
    }

    println!("Snapshots:");
    println!("{:<20} {:>6}  {}", "Taken (UTC)", "Rows", "File");
    println!("{}", "-".repeat(60));

    for file in files {
        let rows = match store.load(&file.path) {
            Ok(table) => table.len().to_string(),
            Err(e) => {
                debug!(file = %file.path.display(), error = %e, "unreadable snapshot");
                "?".to_string()
            }
        };
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "{:<20} {:>6}  {}",
            file.taken_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            rows,
            name
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // a missing .env is fine, variables may come from the scheduler
    let _ = dotenvy::dotenv();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log, cli.verbose, cli.debug);

    let result = match &cli.command {
        Command::Run(args) => cmd_run(&config, args),
        Command::Fetch(args) => cmd_fetch(&config, args),
        Command::Diff(args) => cmd_diff(&config, args),
        Command::List => cmd_list(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
