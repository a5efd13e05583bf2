use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &[
    "blocks-treeviz",
    "mdast-json",
    "mdast-treeviz",
    "resources-json",
];

const FORMATS: &[&str] = &["html", "json", "markdown", "pdf", "treeviz"];

fn snapshot_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .help("Path to the block snapshot (JSON)")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("docx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Export online docx page snapshots to Markdown, HTML, PDF and more")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available output formats and inspect transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a docx.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase logging verbosity (repeat for more)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect internal representations of a snapshot")
                .arg(snapshot_arg("path"))
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply (stage-format). Defaults to 'mdast-treeviz'")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Export a snapshot to an output format (default command)")
                .arg(snapshot_arg("input"))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format")
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS))
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("assets")
                        .long("assets")
                        .value_name("DIR")
                        .help("Directory of downloaded images and attachments, by token")
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report blocks of a snapshot that are not loaded yet")
                .arg(snapshot_arg("input"))
                .arg(
                    Arg::new("whiteboard")
                        .long("whiteboard")
                        .help("Also require whiteboards to be rendered")
                        .action(ArgAction::SetTrue),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "docx", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "docx", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "docx", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
