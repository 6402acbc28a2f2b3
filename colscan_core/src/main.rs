use std::{fs, path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use log::{LevelFilter, error};

use colscan_core::{
    configuration::Configuration,
    core::{
        events::LogEventSink,
        processor::primitive_processor::PrimitiveProcessor,
        protocol::{ColumnRequest, RESULT_HEADER_LEN, ResultReader},
    },
};

#[derive(Parser, Debug)]
#[command(name = "colscan", version, about = "Filters one column block with a wire-format request")]
struct Args {
    /// File holding the encoded column request
    #[arg(long, value_name = "PATH")]
    request: PathBuf,

    /// File holding the raw column block
    #[arg(long, value_name = "PATH")]
    block: PathBuf,

    /// Output buffer capacity in bytes (default: enough for every row)
    #[arg(long, value_name = "N")]
    capacity: Option<usize>,

    /// Largest accepted block in bytes (default: 8192)
    #[arg(long = "block-size", alias = "block_size", value_name = "N")]
    block_size: Option<usize>,

    /// Membership filters up to N literals use an array (default: 8)
    #[arg(long = "array-threshold", alias = "array_threshold", value_name = "N")]
    array_threshold: Option<usize>,

    /// Logging level off, error, warn, info, debug, trace (default: error)
    #[arg(long = "log-level", alias = "log_level", value_name = "LEVEL")]
    log_level: Option<LevelFilter>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level.unwrap_or(LevelFilter::Error);
    env_logger::Builder::new()
        .filter_level(level)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let request_bytes = fs::read(&args.request).map_err(|e| format!("Reading {}: {}", args.request.display(), e))?;
    let block = fs::read(&args.block).map_err(|e| format!("Reading {}: {}", args.block.display(), e))?;

    let config = Configuration {
        block_size: args.block_size,
        membership_array_threshold: args.array_threshold,
        sort_row_ids: None,
    };

    let request = ColumnRequest::parse(&request_bytes).map_err(|e| e.to_string())?;
    let width = request.width;

    // A row id and value for every row is the most a scan can write.
    let capacity = args
        .capacity
        .unwrap_or(RESULT_HEADER_LEN + config.block_size() / width.bytes() * (2 + width.bytes()));
    let mut out = vec![0u8; capacity];

    let processor = PrimitiveProcessor::new(config).with_event_sink(Arc::new(LogEventSink));
    let summary = processor
        .filter_column(request, &block, &mut out, None)
        .map_err(|e| e.to_string())?;

    let header = summary.header;
    println!(
        "lbid={} session={} matches={} rid_flags={:#010b} bytes={}",
        header.lbid, header.session_id, header.match_count, header.rid_flags, summary.written
    );
    if header.valid_min_max {
        println!("min={} max={}", header.min, header.max);
    }

    let reader = ResultReader::new(&out[..summary.written], width).map_err(|e| e.to_string())?;
    for (rid, value) in reader {
        match (rid, value) {
            (Some(rid), Some(value)) => println!("{}\t{:02x?}", rid, value),
            (Some(rid), None) => println!("{}", rid),
            (None, Some(value)) => println!("{:02x?}", value),
            (None, None) => {}
        }
    }

    Ok(())
}
