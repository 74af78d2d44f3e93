//! Subcommand modules for the `mafstream` binary.

use clap::*;
use mafstream::libs::config::StreamConfig;

pub mod check;
pub mod concat;
pub mod separate;
pub mod stream;

/// Pipeline thresholds shared by the subcommands that run the pipeline.
///
/// The defaults match `StreamConfig::default()`.
pub fn config_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("config")
            .long("config")
            .num_args(1)
            .help("JSON file holding every threshold; overrides the options below"),
    )
    .arg(
        Arg::new("allowed_dist")
            .long("allowed-dist")
            .value_parser(value_parser!(u64))
            .default_value("12")
            .help("Largest distance (nt) between continuous rows"),
    )
    .arg(
        Arg::new("min_rows")
            .long("min-rows")
            .value_parser(value_parser!(usize))
            .default_value("3")
            .help("Minimal number of sequence rows of an emitted block"),
    )
    .arg(
        Arg::new("min_len")
            .long("min-len")
            .value_parser(value_parser!(u64))
            .default_value("12")
            .help("Minimal ungapped target length of an emitted block"),
    )
    .arg(
        Arg::new("min_len_del")
            .long("min-len-del")
            .value_parser(value_parser!(u64))
            .default_value("60")
            .help("Blocks at least this long never lose species"),
    )
    .arg(
        Arg::new("max_del")
            .long("max-del")
            .value_parser(value_parser!(usize))
            .default_value("1")
            .help("Maximal number of species dropped by one merge"),
    )
    .arg(
        Arg::new("max_width")
            .long("max-width")
            .value_parser(value_parser!(usize))
            .default_value("3000")
            .help("Blocks wider than this are cut into overlapping windows"),
    )
}

pub fn config_from_args(args: &ArgMatches) -> anyhow::Result<StreamConfig> {
    if let Some(path) = args.get_one::<String>("config") {
        return Ok(StreamConfig::from_json(path)?);
    }

    let config = StreamConfig::builder()
        .allowed_dist(*args.get_one::<u64>("allowed_dist").unwrap())
        .min_block_rows(*args.get_one::<usize>("min_rows").unwrap())
        .min_block_length(*args.get_one::<u64>("min_len").unwrap())
        .min_length_before_deletion(*args.get_one::<u64>("min_len_del").unwrap())
        .max_species_deletions(*args.get_one::<usize>("max_del").unwrap())
        .max_block_width_before_split(*args.get_one::<usize>("max_width").unwrap())
        .build()?;
    Ok(config)
}
