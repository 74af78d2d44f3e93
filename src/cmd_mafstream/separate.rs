use clap::*;
use mafstream::libs::config::StreamConfig;
use mafstream::libs::stream::BlockStream;
use mafstream::libs::writer::MafWriter;
use std::path::{Path, PathBuf};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("separate")
        .about("Write every block of a big block file to its own file")
        .after_help(
            r###"
Block <i> (1-based) of `big_block_3.maf` is written to `big_block_3-s_<i>.maf`.
Blocks are copied as they are, without merging or trimming.

Examples:
1. Files beside the input:
   mafstream separate big_blocks/big_block_3.maf

2. Into another directory:
   mafstream separate big_blocks/big_block_3.maf -o retry/

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Big block MAF file"),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .short('o')
                .num_args(1)
                .help("Output directory. Default: the directory of the input"),
        )
}

/// `big_block_3` for `big_blocks/big_block_3.maf.gz`.
fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(name);
    name.strip_suffix(".maf").unwrap_or(name).to_string()
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let input = Path::new(infile);
    let outdir = match args.get_one::<String>("outdir") {
        Some(dir) => PathBuf::from(dir),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let stem = file_stem(input);

    //----------------------------
    // Ops
    //----------------------------
    if !outdir.as_os_str().is_empty() {
        std::fs::create_dir_all(&outdir)?;
    }
    let stream = BlockStream::open(infile, StreamConfig::default())?;

    //----------------------------
    // Output
    //----------------------------
    let mut count = 0;
    for block in stream {
        let block = block?;
        count += 1;
        let path = outdir.join(format!("{}-s_{}.maf", stem, count));
        let mut writer = MafWriter::new(mafstream::writer(&path.to_string_lossy())?);
        writer.write_block(&block)?;
        writer.flush()?;
    }
    log::info!("{} blocks separated from {}", count, infile);

    Ok(())
}
