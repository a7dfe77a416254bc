//! teibody CLI - rebuild labeled document bodies as TEI and JSON

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use teibody::{render, CoordElement, DocumentInput, DocumentTree, JsonFormat, TeiBody, TeiOptions};

#[derive(Parser)]
#[command(name = "teibody")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild labeled document bodies as TEI and JSON", long_about = None)]
struct Cli {
    /// Input JSON file (labeled tokens and entities)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output TEI file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild a document and write TEI
    Tei {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write everything on one line
        #[arg(long)]
        compact: bool,

        /// Leave footnotes and margin notes out
        #[arg(long)]
        no_notes: bool,

        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Rebuild a document and write the tree as JSON
    Json {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Rebuild every JSON file of a directory
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Show assembly statistics
    Info {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct AssemblyArgs {
    /// Elements that get coordinates (head, ref, s, note, formula)
    #[arg(long, value_delimiter = ',')]
    coords: Vec<String>,

    /// Assign xml:id identifiers
    #[arg(long)]
    ids: bool,

    /// Keep paragraphs whole
    #[arg(long)]
    no_sentences: bool,

    /// Write unresolved citation callouts as plain text
    #[arg(long)]
    drop_unsolved: bool,

    /// Process documents one at a time
    #[arg(long)]
    sequential: bool,
}

impl AssemblyArgs {
    fn builder(&self) -> Result<TeiBody, Box<dyn std::error::Error>> {
        let mut coords = Vec::new();
        for name in &self.coords {
            let element = CoordElement::from_name(name)
                .ok_or_else(|| format!("Unknown coordinate element: {}", name))?;
            coords.push(element);
        }

        let mut builder = TeiBody::new()
            .with_coordinates(&coords)
            .with_ids(self.ids)
            .with_keep_unsolved_callout(!self.drop_unsolved);
        if self.no_sentences {
            builder = builder.without_sentences();
        }
        if self.sequential {
            builder = builder.sequential();
        }
        Ok(builder)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Tei {
            input,
            output,
            compact,
            no_notes,
            assembly,
        }) => cmd_tei(&input, output.as_deref(), compact, no_notes, &assembly),
        Some(Commands::Json {
            input,
            output,
            compact,
            assembly,
        }) => cmd_json(&input, output.as_deref(), compact, &assembly),
        Some(Commands::Batch {
            input,
            output,
            assembly,
        }) => cmd_batch(&input, output.as_deref(), &assembly),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: TEI if input is provided
            if let Some(input) = cli.input {
                cmd_tei(
                    &input,
                    cli.output.as_deref(),
                    false,
                    false,
                    &AssemblyArgs::default(),
                )
            } else {
                println!("{}", "Usage: teibody <FILE> [OUTPUT]".yellow());
                println!("       teibody --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn rebuild(input: &Path, assembly: &AssemblyArgs) -> Result<DocumentTree, Box<dyn std::error::Error>> {
    let doc = DocumentInput::from_file(input)?;
    let tree = assembly.builder()?.process(&doc)?;
    if tree.stats.segmentation_failures > 0 {
        log::warn!(
            "{}: {} paragraphs kept unsegmented",
            input.display(),
            tree.stats.segmentation_failures
        );
    }
    Ok(tree)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_tei(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    no_notes: bool,
    assembly: &AssemblyArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = rebuild(input, assembly)?;

    let mut options = TeiOptions::new().with_notes(!no_notes);
    if compact {
        options = options.compact();
    }
    let tei = render::to_tei(&tree, &options)?;

    write_output(output, &tei)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    assembly: &AssemblyArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = rebuild(input, assembly)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&tree, format)?;

    write_output(output, &json)
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    assembly: &AssemblyArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_name().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_tei", stem))
    });
    fs::create_dir_all(&output_dir)?;

    let mut paths: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let pb = ProgressBar::new(paths.len() as u64 * 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Reading inputs...");
    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        inputs.push(DocumentInput::from_file(path)?);
        pb.inc(1);
    }

    pb.set_message("Rebuilding...");
    let results = assembly.builder()?.process_batch(&inputs);

    let options = TeiOptions::default();
    let mut failed = 0;
    for (path, result) in paths.iter().zip(results) {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        match result.and_then(|tree| render::to_tei(&tree, &options)) {
            Ok(tei) => fs::write(output_dir.join(format!("{}.tei.xml", stem)), tei)?,
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), path.display(), e));
                failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");
    println!(
        "\n{} {} documents written to {}",
        "Done!".green().bold(),
        paths.len() - failed,
        output_dir.display()
    );

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = DocumentInput::from_file(input)?;
    let tree = TeiBody::new().process(&doc)?;

    println!("{}", "Input".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Tokens".bold(), doc.body.tokens.len());
    println!("{}: {}", "Figures".bold(), doc.entities.figures.len());
    println!("{}: {}", "Tables".bold(), doc.entities.tables.len());
    println!("{}: {}", "Equations".bold(), doc.entities.equations.len());
    println!("{}: {}", "References".bold(), doc.entities.bibliography.len());

    println!();
    println!("{}", "Assembly Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for (label, count) in &tree.stats.label_counts {
        println!("{}: {}", label.to_string().bold(), count);
    }

    let sentences: usize = tree
        .paragraphs()
        .filter_map(|p| p.sentences())
        .map(|s| s.len())
        .sum();

    println!("{}: {}", "Divisions".bold(), tree.divisions.len());
    println!("{}: {}", "Paragraphs".bold(), tree.paragraphs().count());
    println!("{}: {}", "Sentences".bold(), sentences);
    println!("{}: {}", "Notes".bold(), tree.notes.len());
    println!(
        "{}: {} resolved, {} unresolved",
        "Callouts".bold(),
        tree.stats.resolved_markers,
        tree.stats.unresolved_markers
    );
    if tree.stats.segmentation_failures > 0 {
        println!(
            "{}: {}",
            "Segmentation failures".yellow().bold(),
            tree.stats.segmentation_failures
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "teibody".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("TEI body assembly from labeled layout tokens");
    println!();
    println!("License: MIT");
}
