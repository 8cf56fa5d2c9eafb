use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use undine::{
    DiagramContext, Edge, GraphSource, Group, MemoryStore, Node, NullSink, RawGraph, Settings,
    Transform,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Diagram(undine::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Diagram(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<undine::Error> for CliError {
    fn from(value: undine::Error) -> Self {
        Self::Diagram(value)
    }
}

const USAGE: &str = "Usage: undine [options] [graph.json]

Reads a topology graph JSON (from the file argument or stdin), runs the
simplification pipeline and the force layout until it settles, and writes the
positioned nodes/edges/groups as JSON to stdout.

Options:
  --config <file>   import a visibility config document before processing
  --ticks <n>       maximum simulation ticks (default 300)
  --no-grouping     lay out without group clustering/containment
  --pretty          pretty-print the output JSON
  -h, --help        show this help";

#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    ticks: Option<usize>,
    no_grouping: bool,
    pretty: bool,
}

fn parse_args() -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(CliError::Usage(USAGE)),
            "--config" => {
                let value = iter.next().ok_or(CliError::Usage("--config needs a file"))?;
                args.config = Some(PathBuf::from(value));
            }
            "--ticks" => {
                let value = iter.next().ok_or(CliError::Usage("--ticks needs a number"))?;
                args.ticks = Some(
                    value
                        .parse()
                        .map_err(|_| CliError::Usage("--ticks needs a number"))?,
                );
            }
            "--no-grouping" => args.no_grouping = true,
            "--pretty" => args.pretty = true,
            _ if arg.starts_with('-') => return Err(CliError::Usage(USAGE)),
            _ => args.input = Some(PathBuf::from(arg)),
        }
    }
    Ok(args)
}

/// Serves one pre-loaded graph for every fetch; the CLI has no backend.
struct StaticSource {
    graph: RawGraph,
}

impl GraphSource for StaticSource {
    fn diagram(&self, _id: &str) -> LocalBoxFuture<'static, Result<RawGraph, String>> {
        let graph = self.graph.clone();
        Box::pin(async move { Ok(graph) })
    }

    fn device(&self, _name: &str) -> LocalBoxFuture<'static, Result<RawGraph, String>> {
        self.diagram("")
    }

    fn subnet(&self, _id: &str) -> LocalBoxFuture<'static, Result<RawGraph, String>> {
        self.diagram("")
    }
}

#[derive(Serialize)]
struct Output<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
    groups: &'a [Group],
    transform: Transform,
}

fn run(args: Args) -> Result<(), CliError> {
    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let graph: RawGraph = serde_json::from_str(&raw)?;

    let settings = Settings {
        grouping: !args.no_grouping,
        ..Settings::default()
    };
    let mut ctx = DiagramContext::new(
        "cli",
        settings,
        Box::new(MemoryStore::new()),
        Box::new(NullSink),
    );
    if let Some(path) = &args.config {
        ctx.import_config(&std::fs::read_to_string(path)?)?;
    }

    let source = StaticSource { graph };
    block_on(ctx.start(&source))?;

    let max_ticks = args.ticks.unwrap_or(300);
    for tick in 0..max_ticks {
        ctx.tick();
        ctx.advance((tick as u64 + 1) * 16);
        let settled = ctx
            .current_layer()
            .and_then(|l| l.engine.as_ref())
            .map(|e| e.settled())
            .unwrap_or(true);
        if settled {
            break;
        }
    }
    // Flush any save the settle requested before exiting.
    ctx.advance(max_ticks as u64 * 16 + 2000);

    let layer = ctx.current_layer().ok_or(undine::Error::NoLayer)?;
    let output = Output {
        nodes: &layer.nodes,
        edges: &layer.edges,
        groups: &layer.groups,
        transform: layer.transform,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
