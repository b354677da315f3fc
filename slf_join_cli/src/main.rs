use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, CommandFactory, Parser, ValueHint};
use slf_join::{join_records, ActivityRecord, JoinParams, Summary, DEFAULT_DATE_FORMAT};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Join two SLF recordings of one activity into a single file",
    long_about = None
)]
struct Cli {
    /// First SLF recording
    #[arg(value_hint = ValueHint::FilePath)]
    first: PathBuf,

    /// Second SLF recording
    #[arg(value_hint = ValueHint::FilePath)]
    second: PathBuf,

    /// Output SLF path (overwritten if it exists)
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// strftime pattern of the `startDate` fields
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// Also write the merged summary as JSON (`-` for stdout)
    #[arg(long, value_hint = ValueHint::FilePath)]
    summary_json: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match handle_join(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            eprintln!("{}", Cli::command().render_usage());
            ExitCode::FAILURE
        }
    }
}

fn handle_join(cli: &Cli) -> Result<()> {
    let missing: Vec<_> = [&cli.first, &cli.second]
        .into_iter()
        .filter(|path| !path.is_file())
        .map(|path| path.display().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!("input file(s) not found: {}", missing.join(", ")));
    }

    let first = load_record(&cli.first)?;
    let second = load_record(&cli.second)?;
    debug!(
        first_entries = first.entries().len(),
        second_entries = second.entries().len(),
        "loaded recordings"
    );

    let params = JoinParams {
        date_format: cli.date_format.clone(),
        ..JoinParams::default()
    };
    let joined = join_records(&first, &second, &params).context("failed to join recordings")?;

    // Serialize fully before touching the output path.
    let bytes = joined.to_xml()?;
    fs::write(&cli.output, bytes)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(
        "Wrote {} ({} entries, {} markers)",
        cli.output.display(),
        joined.entries().len(),
        joined.markers().len()
    );

    if let Some(path) = &cli.summary_json {
        write_summary_json(joined.summary(), path)?;
    }
    Ok(())
}

fn load_record(path: &Path) -> Result<ActivityRecord> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    ActivityRecord::parse(&data).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_summary_json(summary: &Summary, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(summary)?;
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", text)?;
    } else {
        fs::write(path, format!("{}\n", text))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote summary: {}", path.display());
    }
    Ok(())
}
