use clap::*;
use mafstream::libs::stream::BlockStream;
use mafstream::libs::writer::{prepare_output_dir, write_block_index, BigBlockWriter};
use std::path::{Path, PathBuf};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("concat")
        .about("Merge, split and filter a chromosome MAF into big block files")
        .after_help(
            r###"
Runs the whole pipeline on one chromosome MAF file and packs the emitted
blocks into `big_block_<n>.maf` files.

The target row of every emitted block is renamed to <chrom>_<i>_<n>, where
<chrom> is the input file name up to its first dot, <i> counts blocks inside
big block <n>. The JSON block index maps these labels to the numbers
(0-based, in file order) of the input blocks each one was built from.

Notes:
* Input files can be gzipped
* `big_block_<n>.maf` and `<chrom>_*.maf` files left in the output directory
  by earlier runs are removed
* With --single every block is written to its own `<label>.maf` file

Examples:
1. Default output next to the input:
   mafstream concat chr22.maf.gz

2. Smaller big blocks, custom locations:
   mafstream concat chr22.maf.gz --bb-size 200 -o out/ --index out/chr22.json

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Chromosome MAF file"),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .short('o')
                .num_args(1)
                .help("Output directory. Default: big_blocks/ beside the input"),
        )
        .arg(
            Arg::new("bb_size")
                .long("bb-size")
                .num_args(1)
                .default_value("1000")
                .value_parser(value_parser!(usize))
                .help("Blocks per big block file"),
        )
        .arg(
            Arg::new("single")
                .long("single")
                .action(ArgAction::SetTrue)
                .help("Write one file per block"),
        )
        .arg(
            Arg::new("index")
                .long("index")
                .num_args(1)
                .help("Block index JSON. Default: block_dic.json beside the input"),
        );
    super::config_args(cmd)
}

/// `chr22` for `data/chr22.maf.gz`.
fn chrom_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('.').next())
        .unwrap_or_default()
        .to_string()
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let bb_size = *args.get_one::<usize>("bb_size").unwrap();
    let is_single = args.get_flag("single");
    let config = super::config_from_args(args)?;

    let input = Path::new(infile);
    if !input.is_file() {
        anyhow::bail!("MAF file {} does not exist", infile);
    }
    let base_dir = input.parent().map(Path::to_path_buf).unwrap_or_default();
    let outdir = match args.get_one::<String>("outdir") {
        Some(dir) => PathBuf::from(dir),
        None => base_dir.join("big_blocks"),
    };
    let index_file = match args.get_one::<String>("index") {
        Some(file) => PathBuf::from(file),
        None => base_dir.join("block_dic.json"),
    };
    let chrom = chrom_name(input);

    //----------------------------
    // Ops
    //----------------------------
    let stream = BlockStream::open(infile, config)?;

    let removed = prepare_output_dir(&outdir, &chrom, input)?;
    if removed > 0 {
        log::info!("Removed {} old files from {}", removed, outdir.display());
    }

    let mut pipeline = stream.discard_stream();
    let mut writer = BigBlockWriter::new(&outdir, &chrom, bb_size, is_single);
    for block in pipeline.by_ref() {
        let label = writer.push(block?)?;
        log::debug!("Wrote {}", label);
    }

    //----------------------------
    // Output
    //----------------------------
    let index = writer.finish()?;
    write_block_index(&index_file, &index)?;

    let counts = pipeline.counts();
    log::info!(
        "{}: {} raw, {} after trivial merge, {} after deletion merge, {} after split",
        chrom,
        counts.read,
        counts.trivial,
        counts.deletion,
        counts.split
    );
    log::info!("{}: {} blocks written to {}", chrom, counts.emitted, outdir.display());

    Ok(())
}
