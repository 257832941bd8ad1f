use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ellgraph::graph::Graph;
use ellgraph::node::EllipsisTally;
use ellgraph_convert::BatchConverter;
use ellgraph_eval::{DependencyScorer, EvalMode, GraphScorer, Metrics};
use ellgraph_io::json::{read_collection, read_documents, write_collection, GraphDocument};
use ellgraph_io::sdp::{SdpWriter, WriteDependencies};
use ellgraph_io::tree::{BracketedTree, EllipsisStrategy};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod config;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "ellgraph")]
#[command(author, version, about = "Convert, annotate and evaluate ellipsis graphs")]
struct Cli {
    /// Pipeline configuration (JSON).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert constituency trees with elision markers to graphs.
    Convert {
        /// Documents with raw trees (JSON).
        input: PathBuf,

        /// Graph collection to write.
        output: PathBuf,

        /// Only keep sentences with ellipsis.
        #[arg(long)]
        ellipsis_only: bool,

        /// Skip sentences whose bracketed encoding is longer than this.
        #[arg(long, value_name = "LEN")]
        max_length: Option<usize>,
    },

    /// Extract dependencies in SDP format.
    Deps {
        /// Graph collection.
        input: PathBuf,

        /// Output file, standard output if absent.
        output: Option<PathBuf>,
    },

    /// Write graphs as bracketed trees, one per line.
    Tree {
        /// Graph collection.
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = Ellipsis::Omit)]
        ellipsis: Ellipsis,
    },

    /// Count elided functions per function label.
    Tally {
        /// Graph collection.
        input: PathBuf,
    },

    /// Score predicted graphs against gold graphs.
    Eval {
        gold: PathBuf,
        predicted: PathBuf,

        /// Evaluation mode, all modes if absent.
        #[arg(long)]
        mode: Option<EvalMode>,

        /// Score the dependencies of the graphs rather than the graphs.
        #[arg(long)]
        deps: bool,

        /// Print scores per tag.
        #[arg(long)]
        per_tag: bool,

        /// Print scores as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Ellipsis {
    Omit,
    InPlace,
}

impl From<Ellipsis> for EllipsisStrategy {
    fn from(ellipsis: Ellipsis) -> Self {
        match ellipsis {
            Ellipsis::Omit => EllipsisStrategy::Omit,
            Ellipsis::InPlace => EllipsisStrategy::InPlace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Convert {
            input,
            output,
            ellipsis_only,
            max_length,
        } => {
            if max_length.is_some() {
                config.converter.max_encoded_length = max_length;
            }
            convert(&config, &input, &output, ellipsis_only)
        }
        Commands::Deps { input, output } => deps(&config, &input, output.as_deref()),
        Commands::Tree { input, ellipsis } => tree(&input, ellipsis.into()),
        Commands::Tally { input } => tally(&config, &input),
        Commands::Eval {
            gold,
            predicted,
            mode,
            deps,
            per_tag,
            json,
        } => eval(&config, &gold, &predicted, mode, deps, per_tag, json),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_graphs(path: &Path) -> Result<Vec<GraphDocument>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    read_collection(BufReader::new(file))
        .with_context(|| format!("cannot read graphs from {}", path.display()))
}

fn convert(config: &Config, input: &Path, output: &Path, ellipsis_only: bool) -> Result<()> {
    let file = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let raw_docs = read_documents(BufReader::new(file))
        .with_context(|| format!("cannot read trees from {}", input.display()))?;

    let report = BatchConverter::new(config.converter.clone())
        .ellipsis_only(ellipsis_only)
        .convert_all(&raw_docs);

    if report.failures.total() != 0 {
        tracing::warn!(
            "failures per kind: {}",
            serde_json::to_string(&report.failures)?
        );
    }

    let mut docs: Vec<_> = raw_docs
        .iter()
        .map(|doc| GraphDocument::new(doc.name.clone(), Vec::new()))
        .collect();
    for sentence in report.sentences {
        if let Ok(graph) = sentence.result {
            docs[sentence.doc].graphs.push(graph);
        }
    }

    let file = File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    write_collection(&mut writer, &docs)?;
    writer.flush()?;

    tracing::info!(
        "wrote {} graphs to {}",
        docs.iter().map(|doc| doc.graphs.len()).sum::<usize>(),
        output.display()
    );

    Ok(())
}

fn deps(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    let docs = read_graphs(input)?;
    let percolator = config.head_percolator();

    let write: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut writer = SdpWriter::new(write);
    for doc in &docs {
        for (idx, graph) in doc.graphs.iter().enumerate() {
            let deps = percolator
                .dependencies(graph)
                .with_context(|| format!("cannot find heads in sentence {} of {}", idx, doc.name))?;
            writer.write_dependencies(&deps)?;
        }
    }

    writer.into_inner().flush()?;

    Ok(())
}

fn tree(input: &Path, strategy: EllipsisStrategy) -> Result<()> {
    let docs = read_graphs(input)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for graph in docs.iter().flat_map(|doc| &doc.graphs) {
        writeln!(out, "{}", BracketedTree::new(graph, strategy))?;
    }
    out.flush()?;

    Ok(())
}

fn tally(config: &Config, input: &Path) -> Result<()> {
    let docs = read_graphs(input)?;
    let labeler = config.function_labeler();

    let mut total = EllipsisTally::new();
    for mut graph in docs.into_iter().flat_map(|doc| doc.graphs) {
        total.merge(&labeler.count_ellipsis_types(&mut graph));
    }

    println!("{}", serde_json::to_string_pretty(&*total)?);

    Ok(())
}

fn eval(
    config: &Config,
    gold: &Path,
    predicted: &Path,
    mode: Option<EvalMode>,
    deps: bool,
    per_tag: bool,
    json: bool,
) -> Result<()> {
    let flatten = |docs: Vec<GraphDocument>| -> Vec<Graph> {
        docs.into_iter().flat_map(|doc| doc.graphs).collect()
    };
    let gold = flatten(read_graphs(gold)?);
    let predicted = flatten(read_graphs(predicted)?);

    let modes = match mode {
        Some(mode) => vec![mode],
        None => EvalMode::all().to_vec(),
    };

    let scores = if deps {
        let percolator = config.head_percolator();
        let extract = |graphs: &[Graph]| {
            graphs
                .iter()
                .map(|graph| percolator.dependencies(graph))
                .collect::<Result<Vec<_>, _>>()
        };
        let gold = extract(&gold)?;
        let predicted = extract(&predicted)?;

        let scorer = DependencyScorer::default();
        modes
            .iter()
            .map(|&mode| -> Result<(EvalMode, Metrics)> {
                Ok((mode, scorer.score_collection(&gold, &predicted, mode)?))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        modes
            .iter()
            .map(|&mode| -> Result<(EvalMode, Metrics)> {
                Ok((mode, GraphScorer.score_collection(&gold, &predicted, mode)?))
            })
            .collect::<Result<Vec<_>>>()?
    };

    if json {
        let scores: BTreeMap<_, _> = scores
            .iter()
            .map(|(mode, metrics)| (mode.as_str(), metrics))
            .collect();
        println!("{}", serde_json::to_string_pretty(&scores)?);
    } else {
        for (mode, metrics) in &scores {
            print_metrics(*mode, metrics, per_tag);
        }
    }

    Ok(())
}

fn print_metrics(mode: EvalMode, metrics: &Metrics, per_tag: bool) {
    println!("Results for {} nodes", mode);
    println!("{}", metrics);

    if per_tag {
        for (tag, scores) in &metrics.per_tag {
            let f1 = scores
                .labeled
                .f1
                .map(|f1| format!("{:.2}", f1 * 100.0))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{}\t{:.2}\t{:.2}\t{}",
                tag,
                scores.labeled.precision * 100.0,
                scores.labeled.recall * 100.0,
                f1
            );
        }
    }

    println!();
}
