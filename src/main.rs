use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::borrow::Cow;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pgver::cli::{Cli, Command};
use pgver::config::PgverConfig;
use pgver::error::VersionError;
use pgver::registry::{Release, ReleaseRegistry};
use pgver::version::{self, Era, MajorVersion};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding a tracing filter, e.g. `PGVER_LOG=debug`
const LOG_ENV: &str = "PGVER_LOG";

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Handle no-color flag
    if cli.no_color {
        colored::control::set_override(false);
    }

    init_logging(cli.verbose);

    if let Some(Command::Version) = cli.command {
        println!("pgver version {}", VERSION);
        return Ok(ExitCode::SUCCESS);
    }

    let registry = load_registry(&cli)?;
    let registry: &ReleaseRegistry = &registry;
    let versions = cli.get_versions();

    let success = match &cli.command {
        Some(Command::Info { .. }) | None => run_info(registry, &versions, cli.json)?,
        Some(Command::Check {
            well_formed,
            released,
            ..
        }) => run_check(registry, &versions, *well_formed, *released, cli.json)?,
        Some(Command::Num { .. }) => run_num(registry, &versions, cli.json)?,
        Some(Command::Normalize { .. }) => run_normalize(registry, &versions, cli.json)?,
        Some(Command::Date { numeric, .. }) => run_date(registry, &versions, *numeric, cli.json)?,
        Some(Command::After { first, second }) => run_after(registry, first, second, cli.json)?,
        Some(Command::List { era, major, since }) => {
            run_list(registry, *era, major.as_deref(), *since, cli.json)?
        }
        Some(Command::Version) => true,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_registry(cli: &Cli) -> Result<Cow<'static, ReleaseRegistry>> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let (config, sources) =
        PgverConfig::resolve(cli.config.as_deref(), &cwd).map_err(|e| anyhow!(e))?;
    for path in &sources {
        info!("Using config {}", path.display());
    }

    let registry = config
        .build_registry()
        .context("Failed to build release registry")?;
    info!("Release registry holds {} versions", registry.len());
    Ok(registry)
}

/// Hint for a command that was given no versions, e.g. `pgver num 9.6.1 16.0`.
fn missing_versions_hint(registry: &ReleaseRegistry, usage: &str) -> String {
    let latest = registry.latest().map_or("16.0", |r| r.version.as_str());
    format!("No versions given. Try: {} 9.6.1 {}", usage, latest)
}

/// Print the hint to stderr when `versions` is empty. Returns true if it did.
fn hint_if_empty(registry: &ReleaseRegistry, versions: &[String], usage: &str) -> bool {
    if !versions.is_empty() {
        return false;
    }
    eprintln!("{}", missing_versions_hint(registry, usage).yellow());
    true
}

/// Invalid input in red, valid versions the registry can't date in yellow.
fn report_error(err: &VersionError) {
    let message = err.to_string();
    if err.is_invalid() {
        eprintln!("{}", message.red());
    } else {
        eprintln!("{}", message.yellow());
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Everything known about one input string
#[derive(Debug, Serialize)]
struct VersionReport {
    input: String,
    valid: bool,
    well_formed: bool,
    released: bool,
    era: Option<Era>,
    major: Option<MajorVersion>,
    minor: Option<u32>,
    version_number: Option<u32>,
    release_date: Option<NaiveDate>,
    normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl VersionReport {
    fn describe(registry: &ReleaseRegistry, input: &str) -> Self {
        let validated = version::validate(registry, input);
        let parsed = validated.as_ref().ok();

        Self {
            input: input.to_string(),
            valid: parsed.is_some(),
            well_formed: version::is_well_formed(input),
            released: version::is_released(registry, input),
            era: parsed.map(|p| p.era()),
            major: version::major_version(registry, input).ok(),
            minor: parsed.map(|p| p.minor_value()),
            version_number: parsed.map(|p| p.version_number()),
            release_date: version::release_date(registry, input).ok(),
            normalized: version::normalize(registry, input),
            error: validated.as_ref().err().map(|e| e.to_string()),
        }
    }
}

fn run_info(registry: &ReleaseRegistry, versions: &[String], json: bool) -> Result<bool> {
    if hint_if_empty(registry, versions, "pgver") {
        return Ok(true);
    }

    let reports: Vec<VersionReport> = versions
        .iter()
        .map(|v| VersionReport::describe(registry, v))
        .collect();

    if json {
        print_json(&reports)?;
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    Ok(reports.iter().all(|r| r.valid))
}

fn print_report(report: &VersionReport) {
    if !report.valid {
        println!("{} {}", report.input.bold(), "invalid".red());
        if let Some(error) = &report.error {
            println!("  {}", error.dimmed());
        }
        if report.normalized != report.input {
            println!("  did you mean {}?", report.normalized.green());
        } else if report.well_formed {
            println!("  {}", "well-formed, but never released".yellow());
        }
        return;
    }

    let status = match report.release_date {
        Some(date) => format!("released {}", date).green(),
        None => "valid, not released yet".yellow(),
    };
    println!("{} {}", report.input.bold(), status);

    if let (Some(era), Some(major), Some(minor), Some(number)) = (
        report.era,
        report.major,
        report.minor,
        report.version_number,
    ) {
        println!(
            "  era: {}  major: {}  minor: {}  number: {}",
            era, major, minor, number
        );
    }
}

#[derive(Debug, Serialize)]
struct CheckResult {
    input: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_check(
    registry: &ReleaseRegistry,
    versions: &[String],
    well_formed: bool,
    released: bool,
    json: bool,
) -> Result<bool> {
    if hint_if_empty(registry, versions, "pgver check") {
        return Ok(true);
    }

    let results: Vec<CheckResult> = versions
        .iter()
        .map(|input| {
            let outcome = if well_formed {
                version::validate_well_formed(input)
            } else if released {
                version::check_released(registry, input)
            } else {
                version::validate(registry, input)
            };
            CheckResult {
                input: input.clone(),
                ok: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            }
        })
        .collect();

    if json {
        print_json(&results)?;
    } else {
        for result in &results {
            match &result.error {
                None => println!("{} {}", "✓".green(), result.input),
                Some(error) => println!("{} {}: {}", "✗".red(), result.input, error),
            }
        }
    }

    Ok(results.iter().all(|r| r.ok))
}

fn run_num(registry: &ReleaseRegistry, versions: &[String], json: bool) -> Result<bool> {
    if hint_if_empty(registry, versions, "pgver num") {
        return Ok(true);
    }

    let numbers: Vec<(String, Option<u32>)> = versions
        .iter()
        .map(|input| {
            let number = version::version_number(registry, input)
                .inspect_err(|e| {
                    if !json {
                        report_error(e);
                    }
                })
                .ok();
            (input.clone(), number)
        })
        .collect();

    if json {
        let map: serde_json::Map<String, serde_json::Value> = numbers
            .iter()
            .map(|(input, number)| (input.clone(), serde_json::json!(number)))
            .collect();
        print_json(&map)?;
    } else {
        for number in numbers.iter().filter_map(|(_, n)| *n) {
            println!("{}", number);
        }
    }

    Ok(numbers.iter().all(|(_, n)| n.is_some()))
}

fn run_normalize(registry: &ReleaseRegistry, versions: &[String], json: bool) -> Result<bool> {
    if hint_if_empty(registry, versions, "pgver normalize") {
        return Ok(true);
    }

    let normalized: Vec<String> = versions
        .iter()
        .map(|input| version::normalize(registry, input))
        .collect();

    if json {
        print_json(&normalized)?;
    } else {
        for v in &normalized {
            println!("{}", v);
        }
    }

    Ok(true)
}

fn run_date(
    registry: &ReleaseRegistry,
    versions: &[String],
    numeric: bool,
    json: bool,
) -> Result<bool> {
    if hint_if_empty(registry, versions, "pgver date") {
        return Ok(true);
    }

    let dates: Vec<(String, Option<NaiveDate>)> = versions
        .iter()
        .map(|input| {
            let date = version::release_date(registry, input)
                .inspect_err(|e| {
                    if !json {
                        report_error(e);
                    }
                })
                .ok();
            (input.clone(), date)
        })
        .collect();

    if json {
        let map: serde_json::Map<String, serde_json::Value> = dates
            .iter()
            .map(|(input, date)| {
                let value = match date {
                    Some(date) if numeric => serde_json::json!(version::yyyymmdd(*date)),
                    Some(date) => serde_json::json!(date.to_string()),
                    None => serde_json::Value::Null,
                };
                (input.clone(), value)
            })
            .collect();
        print_json(&map)?;
    } else {
        for date in dates.iter().filter_map(|(_, d)| *d) {
            if numeric {
                println!("{}", version::yyyymmdd(date));
            } else {
                println!("{}", date);
            }
        }
    }

    Ok(dates.iter().all(|(_, d)| d.is_some()))
}

fn run_after(registry: &ReleaseRegistry, first: &str, second: &str, json: bool) -> Result<bool> {
    let after = version::released_after(registry, first, second);

    if json {
        print_json(&serde_json::json!({
            "first": first,
            "second": second,
            "released_after": after,
        }))?;
    } else {
        println!("{}", after);
    }

    Ok(after)
}

#[derive(Debug, Serialize)]
struct ListedRelease<'a> {
    version: &'a str,
    date: NaiveDate,
    era: Era,
}

fn run_list(
    registry: &ReleaseRegistry,
    era: Option<Era>,
    major: Option<&str>,
    since: Option<NaiveDate>,
    json: bool,
) -> Result<bool> {
    let matches_major =
        |release: &Release| major.is_none_or(|m| release.parsed.major_version().to_string() == m);
    let matches_since = |release: &Release| since.is_none_or(|d| release.date >= d);

    let candidates = match era {
        Some(era) => registry.releases_in(era),
        None => registry.releases(),
    };
    let releases: Vec<&Release> = candidates
        .into_iter()
        .filter(|&r| matches_major(r) && matches_since(r))
        .collect();

    if json {
        let listed: Vec<ListedRelease> = releases
            .iter()
            .map(|r| ListedRelease {
                version: &r.version,
                date: r.date,
                era: r.parsed.era(),
            })
            .collect();
        print_json(&listed)?;
    } else if releases.is_empty() {
        println!("{}", "No matching releases.".yellow());
    } else {
        for release in &releases {
            println!("{:<8} {}", release.version, release.date.to_string().dimmed());
        }
    }

    Ok(true)
}
