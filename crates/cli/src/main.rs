use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use codescope_chunker::Chunker;
use codescope_indexer::{AnalysisResult, AnalyzerConfig, ProjectAnalyzer};
use codescope_store::TarjanDetector;
use flags::{ChunkKindFlag, ModeFlag};
use report::{AnalyzeReport, ChunksReport, CyclesReport, ParseReport, SearchReport, StoreStatistics};
use serde::Serialize;
use std::path::{Path, PathBuf};

mod flags;
mod report;

#[derive(Parser)]
#[command(name = "codescope")]
#[command(about = "Static structure analysis for Python codebases", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Analyzer configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every Python file under a directory
    Analyze(AnalyzeArgs),

    /// Extract symbols, calls and chunks from one file
    Parse(ParseArgs),

    /// Report call cycles in a project
    Cycles(CyclesArgs),

    /// Search semantic chunks of a project
    Search(SearchArgs),

    /// List the chunks of one file
    Chunks(ChunksArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Project directory
    path: PathBuf,

    /// Include every symbol, call and chunk in the output
    #[arg(long)]
    full: bool,
}

#[derive(Args)]
struct ParseArgs {
    /// Python source file
    file: PathBuf,

    /// What to extract
    #[arg(long, value_enum, default_value = "hybrid")]
    mode: ModeFlag,
}

#[derive(Args)]
struct CyclesArgs {
    /// Project directory
    path: PathBuf,

    /// Report strongly connected components instead of DFS paths
    #[arg(long)]
    tarjan: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Project directory
    path: PathBuf,

    /// Case-insensitive text matched against chunk metadata and content
    query: String,
}

#[derive(Args)]
struct ChunksArgs {
    /// Python source file
    file: PathBuf,

    /// Only chunks from one pass
    #[arg(long, value_enum)]
    kind: Option<ChunkKindFlag>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => run_analyze(args, config),
        Commands::Parse(args) => run_parse(args, config),
        Commands::Cycles(args) => run_cycles(args, config),
        Commands::Search(args) => run_search(args, config),
        Commands::Chunks(args) => run_chunks(args, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Analyze the project at `path` with a fresh analyzer
fn analyze_project(
    path: &Path,
    mut analyzer: ProjectAnalyzer,
) -> Result<(ProjectAnalyzer, AnalysisResult, PathBuf)> {
    let root = path.canonicalize().context("Invalid project path")?;
    let request = analyzer.request(&root);
    let result = analyzer
        .analyze(&request)
        .with_context(|| format!("Failed to analyze {}", root.display()))?;
    Ok((analyzer, result, root))
}

fn run_analyze(args: AnalyzeArgs, config: AnalyzerConfig) -> Result<()> {
    let (analyzer, result, root) = analyze_project(&args.path, ProjectAnalyzer::new(config)?)?;

    let report = AnalyzeReport {
        root: root.display().to_string(),
        summary: &result.statistics,
        duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
        stores: StoreStatistics {
            symbols: analyzer.symbols().statistics(),
            calls: analyzer.calls().statistics(),
            chunks: analyzer.chunks().statistics(),
        },
        entities: args.full.then_some(&result),
    };
    print_json(&report)
}

fn run_parse(args: ParseArgs, config: AnalyzerConfig) -> Result<()> {
    let mode = args.mode.as_domain();
    let mut analyzer = ProjectAnalyzer::new(config)?;
    let analysis = analyzer
        .analyze_file(&args.file, mode)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    print_json(&ParseReport {
        file: args.file.display().to_string(),
        analysis_type: mode.as_str(),
        analysis: &analysis,
    })
}

fn run_cycles(args: CyclesArgs, config: AnalyzerConfig) -> Result<()> {
    let mut analyzer = ProjectAnalyzer::new(config)?;
    let mut detector = "path_dfs";
    if args.tarjan {
        analyzer = analyzer.cycle_detector(TarjanDetector);
        detector = "tarjan";
    }
    let (analyzer, _, _) = analyze_project(&args.path, analyzer)?;

    let calls = analyzer.calls();
    print_json(&CyclesReport {
        detector,
        cycles: calls.find_cycles(),
        call_graph: calls.call_graph(),
        statistics: calls.statistics(),
    })
}

fn run_search(args: SearchArgs, config: AnalyzerConfig) -> Result<()> {
    let (analyzer, _, _) = analyze_project(&args.path, ProjectAnalyzer::new(config)?)?;
    let matches = analyzer.search_semantic(&args.query);
    log::info!("{} chunks match {:?}", matches.len(), args.query);

    print_json(&SearchReport {
        query: &args.query,
        matches,
    })
}

fn run_chunks(args: ChunksArgs, config: AnalyzerConfig) -> Result<()> {
    let analyzer = ProjectAnalyzer::new(config)?;
    let filter = args.kind.map(ChunkKindFlag::as_domain);
    let chunks = analyzer
        .chunks_for_file(&args.file, filter)
        .with_context(|| format!("Failed to chunk {}", args.file.display()))?;

    print_json(&ChunksReport {
        file: args.file.display().to_string(),
        kind: filter.map(|f| f.to_string()),
        summary: Chunker::get_stats(&chunks).to_string(),
        chunks,
    })
}
