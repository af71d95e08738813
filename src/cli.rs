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
use std::path::PathBuf;

use clap::Parser;

use alignment_writer::Format;
use alignment_writer::pack::DEFAULT_BUFFER_SIZE;

#[derive(Parser)]
#[command(version)]
#[command(about = "Pack and unpack pseudoalignment files.")]
pub struct Cli {
    // Input file(s), stdin if not supplied
    #[arg(help = "Input file(s), read from stdin if not supplied")]
    pub input_files: Vec<PathBuf>,

    // Unpack instead of packing
    #[arg(short = 'd', long = "decompress", help = "Unpack packed input")]
    pub decompress: bool,

    // Query names in order of appearance, required when packing
    #[arg(
        long = "reads",
        required_unless_present = "decompress",
        help = "FASTA or FASTQ file containing the query names"
    )]
    pub reads: Option<PathBuf>,

    // Target names in column order, required when packing
    #[arg(
        long = "target-list",
        required_unless_present = "decompress",
        help = "List of target names, one per line, in column order"
    )]
    pub target_list: Option<PathBuf>,

    // Input format when packing, output format when unpacking
    #[arg(
        long = "format",
        help = "Pseudoalignment format: themisto, fulgor, bifrost, metagraph, or sam"
    )]
    pub format: Format,

    // Number of hits that triggers flushing a block
    #[arg(long = "buffer-size", default_value_t = DEFAULT_BUFFER_SIZE, help = "Flush a block after this many hits")]
    pub buffer_size: usize,

    // Retain the input file(s) after success
    #[arg(short = 'k', long = "keep", help = "Keep input file(s) instead of deleting them")]
    pub keep: bool,

    // Overwrite outputs, allow writing binary to a terminal
    #[arg(short = 'f', long = "force", help = "Force overwriting the output file(s)")]
    pub force: bool,

    // Route output to stdout
    #[arg(short = 'c', long = "stdout", help = "Write to standard output, keep input file(s)")]
    pub to_stdout: bool,

    // Decoder thread count
    #[arg(short = 'T', long = "threads", default_value_t = 1, help = "Number of decoder threads, 0 means all available")]
    pub threads: usize,

    // Verbosity
    #[arg(short = 'v', long = "verbose", default_value_t = false, help = "Print progress messages")]
    pub verbose: bool,
}
