//! `intentflow` command-line harness
//!
//! Runs the pipeline from a shell. Results go to stdout as JSON, logs go to
//! stderr.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use intentflow_core::{DocumentKind, IntentOptions, Orchestrator, OrchestratorConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let config = Arg::new("config")
        .long("config")
        .short('c')
        .global(true)
        .value_parser(value_parser!(PathBuf))
        .help("TOML file overriding orchestrator defaults");
    let options = Arg::new("options")
        .long("options")
        .value_name("JSON")
        .help("Intent options as JSON, e.g. '{\"expectedUserVolume\": 5000}'");
    let json_logs = Arg::new("json-logs")
        .long("json-logs")
        .global(true)
        .action(ArgAction::SetTrue)
        .help("Emit logs as JSON lines");

    Command::new("intentflow")
        .version(intentflow_core::VERSION)
        .about("Turn product intents into delivery plans")
        .subcommand_required(true)
        .arg(config)
        .arg(json_logs)
        .subcommand(
            Command::new("process")
                .about("Run the full pipeline for one intent")
                .arg(Arg::new("intent").required(true).help("Free-text intent"))
                .arg(options.clone())
                .arg(
                    Arg::new("documents")
                        .long("documents")
                        .short('d')
                        .value_delimiter(',')
                        .value_parser(DocumentKind::ALL.map(|k| k.slug()))
                        .help("Documents to generate"),
                )
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .action(ArgAction::SetTrue)
                        .help("Print JSON on one line"),
                ),
        )
        .subcommand(
            Command::new("bench")
                .about("Repeat an intent and report performance")
                .arg(Arg::new("intent").required(true).help("Free-text intent"))
                .arg(options)
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .short('n')
                        .default_value("20")
                        .value_parser(value_parser!(u32).range(1..))
                        .help("Number of runs"),
                )
                .arg(
                    Arg::new("no-cache")
                        .long("no-cache")
                        .action(ArgAction::SetTrue)
                        .help("Clear the cache before every run"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<OrchestratorConfig> {
    let Some(path) = matches.get_one::<PathBuf>("config") else {
        return Ok(OrchestratorConfig::default());
    };
    let config = OrchestratorConfig::from_path(path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    Ok(config)
}

fn parse_options(args: &ArgMatches) -> Result<Option<IntentOptions>> {
    args.get_one::<String>("options")
        .map(|raw| serde_json::from_str(raw).context("parsing --options"))
        .transpose()
}

fn document_kinds(args: &ArgMatches) -> Vec<DocumentKind> {
    args.get_many::<String>("documents")
        .into_iter()
        .flatten()
        .filter_map(|slug| DocumentKind::ALL.into_iter().find(|k| k.slug() == slug))
        .collect()
}

async fn process(orchestrator: &Orchestrator, args: &ArgMatches) -> Result<bool> {
    let intent = args
        .get_one::<String>("intent")
        .context("intent is required")?;
    let mut options = parse_options(args)?;

    let kinds = document_kinds(args);
    if !kinds.is_empty() {
        let mut merged = options.unwrap_or_default();
        let mut documents = merged.generate_pm_documents.take().unwrap_or_default();
        documents.documents.extend(kinds);
        merged.generate_pm_documents = Some(documents);
        options = Some(merged);
    }

    let result = orchestrator.process_intent(intent, options).await;
    let rendered = if args.get_flag("compact") {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{rendered}");
    Ok(result.success)
}

async fn bench(orchestrator: &Orchestrator, args: &ArgMatches) -> Result<bool> {
    let intent = args
        .get_one::<String>("intent")
        .context("intent is required")?;
    let options = parse_options(args)?;
    let iterations = args.get_one::<u32>("iterations").copied().unwrap_or(20);
    let no_cache = args.get_flag("no-cache");

    let started = Instant::now();
    let mut failures = 0u32;
    for _ in 0..iterations {
        if no_cache {
            orchestrator.clear_cache();
        }
        let result = orchestrator.process_intent(intent, options.clone()).await;
        if !result.success {
            failures += 1;
        }
    }
    let elapsed = started.elapsed();

    let summary = orchestrator.performance_summary();
    let metrics = orchestrator.performance_metrics();
    println!("Benchmark Report:");
    println!("  Iterations: {iterations}");
    println!("  Failures: {failures}");
    println!("  Wall Time: {}ms", elapsed.as_millis());
    println!("  Average: {:.1}ms", metrics.average_execution_ms);
    println!("  p95: {}ms", metrics.p95_execution_ms);
    println!("  Cache Hit Rate: {:.0}%", metrics.cache_hit_rate * 100.0);
    println!("  Status: {}", summary.status);
    for recommendation in &summary.recommendations {
        println!("  - {recommendation}");
    }

    Ok(failures == 0)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    let config = load_config(&matches)?;
    config.validate().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");
    let orchestrator = Orchestrator::new(config);

    let ok = match matches.subcommand() {
        Some(("process", args)) => process(&orchestrator, args).await?,
        Some(("bench", args)) => bench(&orchestrator, args).await?,
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("no command given"),
    };
    orchestrator.destroy();

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
