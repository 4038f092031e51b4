use clap::{Parser, Subcommand, ValueEnum};
use flowgen::prelude::*;
use flowgen::services::OfflineCatalog;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Catalog collections, as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SearchKindCli {
    Function,
    Connector,
    Type,
}

impl From<SearchKindCli> for SearchKind {
    fn from(kind: SearchKindCli) -> Self {
        match kind {
            SearchKindCli::Function => SearchKind::Function,
            SearchKindCli::Connector => SearchKind::Connector,
            SearchKindCli::Type => SearchKind::Type,
        }
    }
}

/// Generates flow-node templates and renders flow nodes into source edits
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Project directory; defaults to the nearest package above the working directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Generator config file; `flowgen.toml` in the project is used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Symbol catalog JSON file
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the template of a node kind, e.g. `REMOTE_ACTION_CALL`
    Template {
        kind: String,
        /// File the node will be inserted into
        #[arg(long)]
        file: Option<PathBuf>,
        /// Zero-based insertion line
        #[arg(long, default_value_t = 0)]
        line: u32,
        /// Zero-based insertion column
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Symbol the node calls, as `org/module:symbol`
        #[arg(long)]
        symbol: Option<String>,
        /// Type the node should produce, used to prefill data mapping bodies
        #[arg(long)]
        output_type: Option<String>,
    },
    /// Render a node, or an array of nodes, into text edits
    Render {
        node_json: PathBuf,
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the edit that removes a node
    Delete {
        node_json: PathBuf,
        #[arg(long)]
        file: PathBuf,
    },
    /// Search the catalog
    Search {
        #[arg(value_enum)]
        kind: SearchKindCli,
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// File being edited, used to tell imported modules apart
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List the node palette
    Nodes,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let start = cli
        .project
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let project = DiskProject::discover(&start);
    let root = project.project_root(&start);
    let config = GeneratorConfig::load(&root, cli.config.as_deref())
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    let catalog: Arc<dyn Catalog> = match &cli.catalog {
        Some(path) => Arc::new(
            JsonCatalog::from_file(path).unwrap_or_else(|e| exit_with_error(&e.to_string())),
        ),
        None => Arc::new(OfflineCatalog),
    };
    let generator = FlowGenerator::new(Arc::new(project))
        .with_catalog(catalog)
        .with_config(config);

    match cli.command {
        Command::Template {
            kind,
            file,
            line,
            offset,
            symbol,
            output_type,
        } => {
            let kind: NodeKind = kind.parse().unwrap_or_else(|_| {
                exit_with_error(
                    &FlowError::unsupported(kind.as_str(), NodeKind::ALL).to_string(),
                )
            });
            let mut context = generator
                .context()
                .with_position(LinePosition::new(line, offset));
            if let Some(file) = file {
                context = context.with_file(file);
            }
            if let Some(symbol) = symbol {
                context = context.with_codedata(parse_symbol(&symbol));
            }
            if let Some(output_type) = output_type {
                context = context.with_output_type(output_type);
            }
            let node = generator
                .template(kind, &context)
                .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            print_json(&node);
        }
        Command::Render { node_json, file } => {
            let nodes = read_nodes(&node_json);
            if let [node] = nodes.as_slice() {
                let edits = generator
                    .render(node, &file)
                    .unwrap_or_else(|e| exit_with_error(&e.to_string()));
                print_json(&edits);
                return;
            }
            let outcome = generator.render_batch(&nodes, &file);
            for failure in &outcome.failures {
                eprintln!("Node '{}' failed: {}", failure.node_id, failure.error);
            }
            print_json(&outcome.edits);
            if !outcome.is_success() {
                std::process::exit(2);
            }
        }
        Command::Delete { node_json, file } => {
            let nodes = read_nodes(&node_json);
            let mut all = SourceEdits::new();
            for node in &nodes {
                let edits = generator
                    .delete(node, &file)
                    .unwrap_or_else(|e| exit_with_error(&e.to_string()));
                for (path, mut edits) in edits {
                    all.entry(path).or_default().append(&mut edits);
                }
            }
            print_json(&all);
        }
        Command::Search {
            kind,
            query,
            limit,
            offset,
            file,
        } => {
            let mut request = SearchRequest::new(kind.into(), generator.config()).with_query(query);
            request.limit = limit.unwrap_or(request.limit);
            request.offset = offset;
            request.file_path = file;
            let categories = generator
                .search(&request)
                .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            print_json(&categories);
        }
        Command::Nodes => print_json(&generator.available_nodes()),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber installed by the environment takes precedence.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `org/module:symbol`, or a bare `symbol` of the current module.
fn parse_symbol(reference: &str) -> Codedata {
    match reference.split_once(':') {
        Some((module_id, symbol)) => {
            let (org, module) = module_id.split_once('/').unwrap_or(("", module_id));
            Codedata::new().with_module(org, module).with_symbol(symbol)
        }
        None => Codedata::new().with_symbol(reference),
    }
}

/// Reads a single node or an array of nodes.
fn read_nodes(path: &Path) -> Vec<Node> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Could not read '{}': {}", path.display(), e))
    });
    let value: serde_json::Value = serde_json::from_str(&content)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse node JSON: {}", e)));
    let nodes = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value::<Node>(value).map(|node| vec![node])
    };
    nodes.unwrap_or_else(|e| exit_with_error(&format!("Invalid node: {}", e)))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(&format!("Failed to serialize output: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
