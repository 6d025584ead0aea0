/*
cargo run --bin merge_emoji_datastore

cargo run --bin merge_emoji_datastore -- \
    --en  assets/en.json \
    --zh  assets/zh.json \
    --out assets/emoji_merged.json \
    --minify
*/

mod datastore;
mod merger;

use std::fs::{create_dir_all, File};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::info;
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

use datastore::{ensure_inputs_exist, load_json_array, write_json_array, DatastoreError};
use merger::merge_datasets;

/// Merge the English and Chinese emoji datastores into one bilingual JSON file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// English emoji JSON (array of objects)
    #[arg(long, value_name = "PATH", default_value = "assets/en.json")]
    en: PathBuf,

    /// Chinese emoji JSON (array of objects)
    #[arg(long, value_name = "PATH", default_value = "assets/zh.json")]
    zh: PathBuf,

    /// Output path for the merged JSON (parent directories are created)
    #[arg(long, value_name = "PATH", default_value = "assets/emoji_merged.json")]
    out: PathBuf,

    /// Write minified JSON instead of pretty-printed
    #[arg(long)]
    minify: bool,

    /// Directory for the run log
    #[arg(long, value_name = "PATH", default_value = "logs")]
    log_dir: PathBuf,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(count) => println!("Merged {count} emojis to {}", args.out.display()),
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            let code = e
                .downcast_ref::<DatastoreError>()
                .map_or(1, DatastoreError::exit_code);
            process::exit(code);
        }
    }
}

fn run(args: &Args) -> Result<usize> {
    // nothing is created on disk until both inputs are known to exist
    ensure_inputs_exist(&args.en, &args.zh)?;

    // logging setup
    create_dir_all(&args.log_dir)
        .with_context(|| format!("creating log directory {}", args.log_dir.display()))?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = args.log_dir.join(format!("merge_emoji_datastore_{ts}.log"));
    WriteLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        File::create(&log_path).with_context(|| format!("creating {}", log_path.display()))?,
    )?;
    info!(
        "Started - en: {:?}, zh: {:?}, out: {:?}, minify: {}",
        args.en, args.zh, args.out, args.minify
    );

    let en_data = load_json_array(&args.en)?;
    info!("Loaded {} entries from {:?}", en_data.len(), args.en);
    let zh_data = load_json_array(&args.zh)?;
    info!("Loaded {} entries from {:?}", zh_data.len(), args.zh);

    let (merged, stats) = merge_datasets(&en_data, &zh_data);
    info!(
        "Joined {} emojis: {} in both, {} English only, {} Chinese only",
        merged.len(),
        stats.both,
        stats.primary_only,
        stats.secondary_only
    );
    info!(
        "Duplicate emojis overwritten: {} English, {} Chinese",
        stats.primary_duplicates, stats.secondary_duplicates
    );

    write_json_array(&args.out, &merged, args.minify)?;
    info!("Wrote {} entries → {:?}", merged.len(), args.out);

    Ok(merged.len())
}
