//! polygon-graph command line tool
//!
//! Reads a GeoJSON polygon layer, groups it by an attribute field and writes
//! the resulting adjacency graph to a file.

use clap::{Arg, ArgAction, ArgMatches, Command};
use polygon_graph::core::Config;
use polygon_graph::{pipeline, system, Error, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

fn main() -> ExitCode {
    let matches = command().get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("polygon-graph: {}", e);
            if e.is_input_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn command() -> Command {
    Command::new("polygon-graph")
        .version(polygon_graph::VERSION)
        .about("Builds a graph of attribute values whose polygons intersect.")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .required(true)
                .help("GeoJSON polygon layer")
        )
        .arg(
            Arg::new("field")
                .short('f')
                .long("field")
                .value_name("FIELD")
                .required(true)
                .help("Attribute field whose values become vertices")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .required(true)
                .help("Destination of the serialized graph")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output format (auto, json, msgpack, bincode)")
        )
        .arg(
            Arg::new("null-policy")
                .long("null-policy")
                .value_name("POLICY")
                .help("Features without a value (skip, unclassified)")
        )
        .arg(
            Arg::new("touch")
                .long("touch")
                .value_name("SEMANTICS")
                .help("Edge semantics for shared boundaries (intersects, interior)")
        )
        .arg(
            Arg::new("no-index")
                .long("no-index")
                .action(ArgAction::SetTrue)
                .help("Disable the bounding-box pre-filter")
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("N")
                .help("Pair sweep worker threads (0 = one per CPU)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
}

fn run(matches: &ArgMatches) -> Result<()> {
    // Load configuration
    let mut config = if let Some(config_path) = matches.get_one::<String>("config") {
        let mut config = Config::from_file(config_path)?;
        config.apply_env_overrides()?;
        config
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    apply_cli_overrides(&mut config, matches)?;
    config.validate()?;

    polygon_graph::init(&config.logging.level, config.logging.format == "compact")?;

    let input = required_path(matches, "input")?;
    let output = required_path(matches, "output")?;
    let field = matches
        .get_one::<String>("field")
        .ok_or_else(|| Error::invalid_input("missing --field"))?;

    let summary = pipeline::run(&input, field, &output, &config)?;
    info!(
        "Done: {} features ({} skipped) -> {} vertices, {} edges in {:?}",
        summary.features, summary.skipped, summary.vertices, summary.edges, summary.elapsed
    );
    debug!("Metrics:\n{}", system::metrics::gather_text());

    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(format) = matches.get_one::<String>("format") {
        config.output.format = format.parse()?;
    }

    if let Some(policy) = matches.get_one::<String>("null-policy") {
        config.grouping.null_policy = policy.parse()?;
    }

    if let Some(touch) = matches.get_one::<String>("touch") {
        config.build.touch = touch.parse()?;
    }

    if matches.get_flag("no-index") {
        config.build.use_bbox_index = false;
    }

    if let Some(workers) = matches.get_one::<String>("workers") {
        config.build.worker_threads = workers.parse()
            .map_err(|e| Error::config(format!("Invalid worker count: {}", e)))?;
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    Ok(())
}

fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| Error::invalid_input(format!("missing {}", name)))
}
