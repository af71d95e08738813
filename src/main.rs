// alignment-writer: Pack and unpack pseudoalignment matrices.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::IsTerminal;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;

use alignment_writer::Error;
use alignment_writer::QueryIndex;
use alignment_writer::Result;
use alignment_writer::TargetIndex;
use alignment_writer::input;
use alignment_writer::pack;
use alignment_writer::print_alignment;

mod cli;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
        .module(module_path!())
        .quiet(false)
        .verbosity(log_max_level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

fn main() {
    let cli = cli::Cli::parse();
    init_log(if cli.verbose { 2 } else { 1 });

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &cli::Cli) -> Result<()> {
    let n_threads = if cli.threads == 0 {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    } else {
        cli.threads
    };

    let indexes = if cli.decompress { None } else { Some(read_indexes(cli)?) };

    if cli.input_files.is_empty() {
        let stdin = io::stdin();
        let mut conn_in = stdin.lock();
        let mut conn_out = open_stdout(cli)?;

        if let Some((queries, targets)) = &indexes {
            pack(&cli.format, queries, targets, cli.buffer_size, &mut conn_in, &mut conn_out)?;
        } else {
            print_alignment(&cli.format, &mut conn_in, &mut conn_out, n_threads)?;
        }
        conn_out.flush()?;
        return Ok(());
    }

    for file in &cli.input_files {
        if let Some((queries, targets)) = &indexes {
            pack_file(cli, queries, targets, file)?;
        } else {
            unpack_file(cli, file, n_threads)?;
        }
    }
    Ok(())
}

fn read_indexes(cli: &cli::Cli) -> Result<(QueryIndex, TargetIndex)> {
    let reads = cli.reads.as_ref().ok_or_else(|| missing_option("--reads"))?;
    let target_list = cli.target_list.as_ref().ok_or_else(|| missing_option("--target-list"))?;

    let queries = input::read_query_index(reads)?;
    let targets = input::read_target_index(target_list)?;
    log::info!("Packing alignments against {} queries and {} targets", queries.len(), targets.len());

    Ok((queries, targets))
}

fn pack_file(cli: &cli::Cli, queries: &QueryIndex, targets: &TargetIndex, file: &Path) -> Result<()> {
    let mut conn_in = input::open_input(file)?;

    if cli.to_stdout {
        let mut conn_out = open_stdout(cli)?;
        pack(&cli.format, queries, targets, cli.buffer_size, &mut conn_in, &mut conn_out)?;
        conn_out.flush()?;
        return Ok(());
    }

    let out_path = PathBuf::from(format!("{}.aln", file.to_string_lossy()));
    let mut conn_out = BufWriter::new(create_output(&out_path, cli.force)?);
    pack(&cli.format, queries, targets, cli.buffer_size, &mut conn_in, &mut conn_out)?;
    conn_out.flush()?;
    log::info!("Wrote {}", out_path.display());

    if !cli.keep {
        std::fs::remove_file(file)?;
    }
    Ok(())
}

fn unpack_file(cli: &cli::Cli, file: &Path, n_threads: usize) -> Result<()> {
    let mut conn_in = BufReader::new(File::open(file)?);

    if cli.to_stdout {
        let mut conn_out = open_stdout(cli)?;
        print_alignment(&cli.format, &mut conn_in, &mut conn_out, n_threads)?;
        conn_out.flush()?;
        return Ok(());
    }

    let out_path = strip_packed_extension(file)?;
    let mut conn_out = BufWriter::new(create_output(&out_path, cli.force)?);
    print_alignment(&cli.format, &mut conn_in, &mut conn_out, n_threads)?;
    conn_out.flush()?;
    log::info!("Wrote {}", out_path.display());

    if !cli.keep {
        std::fs::remove_file(file)?;
    }
    Ok(())
}

// Packed output to a terminal is refused without --force; unpacked text
// goes through unconditionally.
fn open_stdout(cli: &cli::Cli) -> Result<BufWriter<io::Stdout>> {
    if !cli.decompress && !cli.force && io::stdout().is_terminal() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::Other,
            "refusing to write packed data to a terminal, use --force to override",
        )));
    }
    Ok(BufWriter::new(io::stdout()))
}

fn create_output(path: &Path, force: bool) -> Result<File> {
    if path.exists() && !force {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("output file {} exists, use --force to overwrite", path.display()),
        )));
    }
    Ok(File::create(path)?)
}

fn strip_packed_extension(file: &Path) -> Result<PathBuf> {
    if file.extension().is_some_and(|ext| ext == "aln") {
        Ok(file.with_extension(""))
    } else {
        Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{}: unknown suffix, use --stdout to write to standard output", file.display()),
        )))
    }
}

fn missing_option(name: &str) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} is required when packing", name),
    ))
}
