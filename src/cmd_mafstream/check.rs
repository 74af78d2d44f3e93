use clap::*;
use mafstream::libs::config::StreamConfig;
use mafstream::libs::stream::BlockStream;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("check")
        .about("Find blocks whose target has an unexpected source size")
        .after_help(
            r###"
Every block of the input files is compared with the expected length of the
target sequence. That length is either given with --size or read from the
first block of --reference, usually the chromosome MAF the big blocks were
made from.

Output:
    <target>\t<source size>\t<input file>
for every offending block, followed by a summary line on stderr.

Examples:
1. Against the chromosome file:
   mafstream check big_blocks/*.maf --reference chr22.maf.gz

2. Against a known length:
   mafstream check big_blocks/*.maf --size 50818468

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("MAF files to check"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .num_args(1)
                .value_parser(value_parser!(u64))
                .help("Expected source size of the target"),
        )
        .arg(
            Arg::new("reference")
                .long("reference")
                .num_args(1)
                .conflicts_with("size")
                .help("MAF file whose first block gives the expected size"),
        )
        .group(
            ArgGroup::new("expected")
                .args(["size", "reference"])
                .required(true),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let expected = match args.get_one::<u64>("size") {
        Some(size) => *size,
        None => {
            let reference = args.get_one::<String>("reference").unwrap();
            let mut stream = BlockStream::open(reference, StreamConfig::default())?;
            match stream.next() {
                Some(block) => block?.target()?.src_size,
                None => anyhow::bail!("No block in {}", reference),
            }
        }
    };
    let mut writer = mafstream::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Ops
    //----------------------------
    let mut total = 0;
    let mut bad = vec![];
    for infile in args.get_many::<String>("infiles").unwrap() {
        for block in BlockStream::open(infile, StreamConfig::default())? {
            let block = block?;
            let target = block.target()?;
            total += 1;
            if target.src_size != expected {
                bad.push((target.name.clone(), target.src_size, infile.clone()));
            }
        }
    }

    //----------------------------
    // Output
    //----------------------------
    for (name, size, infile) in &bad {
        writeln!(writer, "{}\t{}\t{}", name, size, infile)?;
    }
    writer.flush()?;
    eprintln!(
        "{} of {} blocks differ from the expected size {}",
        bad.len(),
        total,
        expected
    );

    Ok(())
}
