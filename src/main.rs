use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use pine_huffman::{HuffmanCoding, PineProperties, Result, TableLayout, TreeMagnitude};

const EXTENSION: &str = ".pine";

#[derive(Parser, Debug)]
#[command(name = "pine", about = "Compress or decompress a file with static Huffman coding")]
struct Args {
    /// File to compress or decompress
    file: PathBuf,
    /// Decompress the file
    #[arg(short, long)]
    decompress: bool,
    /// Output filename, defaults to adding/removing .pine
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Java-style properties file with the container conventions
    #[arg(short, long)]
    properties: Option<PathBuf>,
    /// Width of the table size header, overrides the properties file
    #[arg(long, value_parser = parse_magnitude)]
    tree_magnitude: Option<TreeMagnitude>,
    /// Table layout (sentinel or lengthprefixed), overrides the properties file
    #[arg(long)]
    layout: Option<TableLayout>,
    /// Also write the effective properties next to the compressed file
    #[arg(long, default_value_t = false)]
    save_properties: bool,
    /// Print the code table as JSON after compressing
    #[arg(long, default_value_t = false)]
    print_table: bool,
    /// Log progress to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn parse_magnitude(s: &str) -> std::result::Result<TreeMagnitude, String> {
    let width: usize = s.parse().map_err(|_| format!("{s} is not a number"))?;
    TreeMagnitude::try_from(width).map_err(|e| e.to_string())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn output_path(args: &Args) -> PathBuf {
    if let Some(out) = &args.output {
        return out.clone();
    }

    let name = args.file.to_string_lossy();
    if args.decompress {
        let stem = name.strip_suffix(EXTENSION).map(str::to_owned);
        PathBuf::from(stem.unwrap_or_else(|| format!("{name}.out")))
    } else {
        PathBuf::from(format!("{name}{EXTENSION}"))
    }
}

fn run(args: Args) -> Result<()> {
    let mut props = match &args.properties {
        Some(path) => PineProperties::load(path)?,
        None => PineProperties::default(),
    };
    if let Some(magnitude) = args.tree_magnitude {
        props.tree_magnitude = magnitude;
    }
    if let Some(layout) = args.layout {
        props.table_layout = layout;
    }

    let dest = output_path(&args);
    let coding = HuffmanCoding::new(props);

    let time = Instant::now();
    if args.decompress {
        println!("decompressing {}", args.file.display());
        let written = coding.decompress_file(&args.file, &dest)?;
        println!("wrote {} bytes to {}", written, dest.display());
        println!("time to decompress: {:.4}s", time.elapsed().as_secs_f64());
        return Ok(());
    }

    println!("compressing {}", args.file.display());
    let (stats, table) = coding.compress_file(&args.file, &dest)?;
    println!("time to compress: {:.4}s", time.elapsed().as_secs_f64());
    println!("{}", serde_json::to_string(&stats).map_err(std::io::Error::from)?);

    if args.print_table {
        println!("{}", serde_json::to_string_pretty(&table).map_err(std::io::Error::from)?);
    }
    if args.save_properties {
        let props_path = PathBuf::from(format!("{}.properties", dest.display()));
        std::fs::write(&props_path, String::from(coding.properties()))?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
