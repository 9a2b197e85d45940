use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use ujdom::{unpack_format, HeapConfig, Kind, Node, NodeRef, Session, DEFAULT_INITIAL_HEAP};

const KINDS: [Kind; 9] = [
    Kind::Null,
    Kind::True,
    Kind::False,
    Kind::Int32,
    Kind::Int64,
    Kind::Double,
    Kind::String,
    Kind::Array,
    Kind::Object,
];

#[derive(Parser, Debug)]
#[command(name = "ujdom", version, about = "Decode JSON into an arena DOM and inspect it")]
struct Args {
    /// Input JSON file. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Comma-separated keys to unpack from the root object.
    #[arg(short, long, value_delimiter = ',', value_name = "keys")]
    keys: Vec<String>,

    /// One type code per key: B N S A O U, lowercase also accepts null (default: all u).
    #[arg(short, long, value_name = "codes")]
    format: Option<String>,

    /// Size of the first arena slab in bytes.
    #[arg(long = "heap-size", value_name = "bytes", default_value_t = DEFAULT_INITIAL_HEAP)]
    heap_size: usize,

    /// Print arena statistics after decoding.
    #[arg(long)]
    stats: bool,

    /// Log arena and decoder activity to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);
    if let Err(err) = run(&args) {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = read_input(args.input.as_deref())?;
    let session = Session::with_config(HeapConfig::new().with_initial_capacity(args.heap_size))?;
    let root = session.decode(&input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.keys.is_empty() {
        write_census(&mut out, root)?;
    } else {
        write_unpacked(&mut out, root, &args.keys, args.format.as_deref())?;
    }

    if args.stats {
        let stats = session.stats();
        writeln!(out, "slabs: {}", stats.slabs)?;
        writeln!(out, "owned slabs: {}", stats.owned_slabs)?;
        writeln!(out, "reserved bytes: {}", stats.reserved_bytes)?;
        writeln!(out, "used bytes: {}", stats.used_bytes)?;
    }

    session.release();
    Ok(())
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(fs::read(path)?),
    }
}

fn write_census(out: &mut dyn Write, root: NodeRef<'_>) -> Result<(), Box<dyn Error>> {
    let mut counts = [0usize; KINDS.len()];
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        counts[node.kind() as usize] += 1;
        stack.extend(node.begin_array());
        stack.extend(node.begin_object().map(|(_, value)| value));
    }

    writeln!(out, "root: {}", root.kind())?;
    writeln!(out, "nodes: {}", counts.iter().sum::<usize>())?;
    for kind in KINDS {
        writeln!(out, "{kind}: {}", counts[kind as usize])?;
    }
    Ok(())
}

fn write_unpacked(
    out: &mut dyn Write,
    root: NodeRef<'_>,
    keys: &[String],
    format: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let format = match format {
        Some(format) => format.to_string(),
        None => "u".repeat(keys.len()),
    };
    let names: Vec<&str> = keys.iter().map(String::as_str).collect();
    let mut slots = vec![None; names.len()];
    let found = unpack_format(root, &names, &format, &mut slots)?;

    for (name, slot) in names.iter().zip(&slots) {
        match slot {
            Some(node) => writeln!(out, "{name}: {}", describe(node))?,
            None => writeln!(out, "{name}: <missing>")?,
        }
    }
    writeln!(out, "matched: {found}/{}", names.len())?;
    Ok(())
}

fn describe(node: &Node<'_>) -> String {
    match node {
        Node::Null | Node::True | Node::False => node.kind().to_string(),
        Node::Int32(value) => format!("int32 {value}"),
        Node::Int64(value) => format!("int64 {value}"),
        Node::Double(value) => format!("double {value}"),
        Node::String(text) => format!("string {text:?}"),
        Node::Array(array) => format!("array ({} entries)", array.iter().count()),
        Node::Object(object) => format!("object ({} members)", object.iter().count()),
    }
}
