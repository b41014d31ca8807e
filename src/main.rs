// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tabfile::config::{validate_config, Config};
use tabfile::{Registry, Song};
use tracing::Level;

fn print_usage() {
    println!("tabfile - Guitar Pro 3/4/5 reader and writer");
    println!();
    println!("Usage: tabfile [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  info <file>                 Print the version, metadata and track list");
    println!("  dump <file>                 Print the whole song as YAML");
    println!("  convert <in> <out> [TAG]    Rewrite a file as another version");
    println!("  versions                    List supported version tags");
    println!();
    println!("Options:");
    println!("  --config <path>   Load settings from a YAML file");
    println!("  -v                Debug logging");
    println!("  --help            Show this help message");
}

fn init_logging(level: &str, verbose: bool) -> Result<()> {
    let level: Level = if verbose {
        Level::DEBUG
    } else {
        level
            .parse()
            .map_err(|_| anyhow!("Invalid log level: {}", level))?
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_song(path: &str, config: &Config) -> Result<Song> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    tabfile::parse_with(BufReader::new(file), &config.codec)
        .with_context(|| format!("Failed to read {}", path))
}

fn show_info(path: &str, config: &Config) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let tag = tabfile::read_version(BufReader::new(file))?;
    let song = load_song(path, config)?;

    println!("Version:  {}", tag);
    println!("Title:    {}", song.title);
    println!("Artist:   {}", song.artist);
    println!("Album:    {}", song.album);
    println!("Tempo:    {}", song.tempo);
    println!("Measures: {}", song.measure_headers.len());
    println!();
    println!("Tracks:");
    for (i, track) in song.tracks.iter().enumerate() {
        println!(
            "  {}. {} ({} strings, {} frets)",
            i + 1,
            track.name,
            track.strings.len(),
            track.fret_count
        );
    }
    Ok(())
}

fn dump(path: &str, config: &Config) -> Result<()> {
    let song = load_song(path, config)?;
    let yaml = serde_yaml::to_string(&song).context("Failed to serialize song to YAML")?;
    print!("{}", yaml);
    Ok(())
}

/// Pick the output tag: explicit argument, then extension, then config
fn target_tag(output: &str, explicit: Option<&String>, config: &Config) -> Result<String> {
    if let Some(tag) = explicit {
        return Ok(tag.clone());
    }
    let registry = Registry::new();
    Path::new(output)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| registry.version_for_extension(ext))
        .map(str::to_string)
        .or_else(|| config.codec.default_version.clone())
        .ok_or_else(|| anyhow!("Cannot tell the output version of {}; pass a version tag", output))
}

fn convert(input: &str, output: &str, explicit: Option<&String>, config: &Config) -> Result<()> {
    let tag = target_tag(output, explicit, config)?;
    let registry = Registry::new();
    if !registry.is_supported(&tag) {
        return Err(anyhow!("Unsupported version tag: {}", tag));
    }
    let song = load_song(input, config)?;
    tabfile::validate_song(&song)?;

    let file = File::create(output).with_context(|| format!("Failed to create {}", output))?;
    tabfile::write_with(&song, BufWriter::new(file), &tag, &config.codec)
        .with_context(|| format!("Failed to write {}", output))?;
    println!("Wrote {} as {}", output, tag);
    Ok(())
}

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().collect();

    let verbose = match args.iter().position(|a| a == "-v") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };
    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            if i + 1 >= args.len() {
                eprintln!("Error: --config requires a path");
                std::process::exit(1);
            }
            let path = args.remove(i + 1);
            args.remove(i);
            validate_config(&path)?
        }
        None => Config::default(),
    };

    if args.len() < 2 {
        println!("tabfile - Guitar Pro 3/4/5 reader and writer");
        println!("Run with --help for usage information");
        return Ok(());
    }

    init_logging(&config.logging.level, verbose)?;

    match args[1].as_str() {
        "info" => {
            if args.len() < 3 {
                eprintln!("Error: info requires a file");
                std::process::exit(1);
            }
            show_info(&args[2], &config)?;
        }
        "dump" => {
            if args.len() < 3 {
                eprintln!("Error: dump requires a file");
                std::process::exit(1);
            }
            dump(&args[2], &config)?;
        }
        "convert" => {
            if args.len() < 4 {
                eprintln!("Error: convert requires an input and an output file");
                std::process::exit(1);
            }
            convert(&args[2], &args[3], args.get(4), &config)?;
        }
        "versions" => {
            for tag in Registry::new().tags() {
                println!("{}", tag);
            }
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
