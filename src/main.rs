use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use markie_levels::{LevelAssigner, LevelOptions, LevelReport, Strategy, parse_graph};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Assign layout levels to the nodes of a flowchart-style graph
#[derive(Parser, Debug)]
#[command(name = "markie-levels")]
#[command(version)]
#[command(about = "Assign layout levels to a flowchart-style graph", long_about = None)]
struct Args {
    /// Input graph file (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Rank from sinks instead of sources
    #[arg(short, long)]
    reverse: bool,

    /// Cycle handling strategy (overrides the config file)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Options file with a `levels` section (TOML or YAML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Log cycle discovery to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "markie-levels", &mut std::io::stdout());
        return Ok(());
    }

    let mut options = match args.config {
        Some(ref path) => load_options(path)?,
        None => LevelOptions::default(),
    };
    if args.reverse {
        options = options.reversed();
    }
    if let Some(strategy) = args.strategy {
        options = options.with_strategy(strategy);
    }

    let input = args.input.as_ref().ok_or("No input file given")?;
    let source = if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let graph = parse_graph(&source).map_err(|e| format!("Failed to parse graph: {}", e))?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "parsed graph"
    );

    let result = LevelAssigner::new(options).run(&graph);
    let report = LevelReport::new(&graph, &result, options);

    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => {
            let json = report
                .to_json()
                .map_err(|e| format!("Failed to write JSON: {}", e))?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn load_options(path: &Path) -> Result<LevelOptions, String> {
    if !path.is_file() {
        return Err(format!("Config file not found: {}", path.display()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;
    LevelOptions::from_config_str(&content)
        .map_err(|e| format!("Failed to parse config file: {}", e))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}
