use clap::*;
use mafstream::libs::stream::{BlockStream, Stage};
use mafstream::libs::writer::MafWriter;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("stream")
        .about("Print the blocks emitted by one pipeline stage")
        .after_help(
            r###"
Stages:
* raw      - blocks as read, empty blocks skipped
* trivial  - neighbours joined when every shared species is continuous
* deletion - short neighbours joined at the cost of a few species
* split    - blocks wider than --max-width cut into overlapping windows
* final    - trimmed, with small blocks dropped

Blocks are numbered from 0 in file order. --from/--to limit the input blocks
fed into the pipeline, --position keeps the emitted blocks whose target
interval overlaps <start>-<end> (0-based, end exclusive).

Examples:
1. The final blocks of input blocks 100 to 200:
   mafstream stream chr22.maf.gz --from 100 --to 200

2. Merged but unsplit blocks around a locus:
   mafstream stream chr22.maf.gz --stage deletion --position 16022637-16022669

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("MAF file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("stage")
                .long("stage")
                .num_args(1)
                .default_value("final")
                .value_parser(["raw", "trivial", "deletion", "split", "final"])
                .help("Pipeline stage to print"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("First input block"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Last input block, inclusive"),
        )
        .arg(
            Arg::new("position")
                .long("position")
                .num_args(1)
                .help("Target interval, <start>-<end>"),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .action(ArgAction::SetTrue)
                .help("Sort the non-target rows by species name"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        );
    super::config_args(cmd)
}

fn parse_position(text: &str) -> anyhow::Result<(u64, u64)> {
    let (start, end) = text
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("Position must look like <start>-<end>: {}", text))?;
    let start: u64 = start.trim().parse()?;
    let end: u64 = end.trim().parse()?;
    if start >= end {
        anyhow::bail!("Empty position {}", text);
    }
    Ok((start, end))
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let stage: Stage = args
        .get_one::<String>("stage")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let first = args.get_one::<usize>("from").copied().unwrap_or(0);
    let last = args.get_one::<usize>("to").copied();
    let position = match args.get_one::<String>("position") {
        Some(text) => Some(parse_position(text)?),
        None => None,
    };
    let is_sort = args.get_flag("sort");
    let config = super::config_from_args(args)?;

    if last.is_some_and(|last| last < first) {
        anyhow::bail!("--to must not be smaller than --from");
    }

    //----------------------------
    // Ops
    //----------------------------
    let mut stream = BlockStream::open(infile, config)?;
    if first > 0 || last.is_some() {
        stream = stream.restrict(first, last.unwrap_or(usize::MAX))?;
    }

    let mut writer = MafWriter::new(mafstream::writer(args.get_one::<String>("outfile").unwrap())?);
    writer.write_header("mafstream")?;

    //----------------------------
    // Output
    //----------------------------
    let mut count = 0;
    for block in stream.stage(stage) {
        let mut block = block?;
        if let Some((start, end)) = position {
            if !block.overlaps(start, end) {
                continue;
            }
        }
        if is_sort {
            block.sort_by_species();
        }
        writer.write_block(&block)?;
        count += 1;
    }
    writer.flush()?;
    log::info!("{} blocks at stage {:?}", count, stage);

    Ok(())
}
