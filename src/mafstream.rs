extern crate clap;
use clap::*;

mod cmd_mafstream;

fn main() -> anyhow::Result<()> {
    let app = Command::new("mafstream")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`mafstream` - Merge, split and filter MAF alignment blocks")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log more; repeat for debug output"),
        )
        .subcommand(cmd_mafstream::concat::make_subcommand())
        .subcommand(cmd_mafstream::stream::make_subcommand())
        .subcommand(cmd_mafstream::separate::make_subcommand())
        .subcommand(cmd_mafstream::check::make_subcommand())
        .after_help(
            r###"Subcommands:

* concat   - Whole pipeline, packed into big block files
* stream   - Print the blocks of one pipeline stage
* separate - Split a big block file into one file per block
* check    - Find blocks with an unexpected target sequence size

Pipeline:
    raw blocks -> trivial merge -> deletion merge -> window split -> trim & filter

"###,
        );

    let matches = app.get_matches();

    env_logger::Builder::new()
        .filter_level(match matches.get_count("verbose") {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("concat", sub_matches)) => cmd_mafstream::concat::execute(sub_matches),
        Some(("stream", sub_matches)) => cmd_mafstream::stream::execute(sub_matches),
        Some(("separate", sub_matches)) => cmd_mafstream::separate::execute(sub_matches),
        Some(("check", sub_matches)) => cmd_mafstream::check::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
