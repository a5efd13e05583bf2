// Command-line interface for docx export
//
// This binary converts snapshots of online docx pages (the editor's block tree, saved as JSON)
// into Markdown and the other output formats of docx-babel.
//
// Converting:
//
// The conversion needs a target format; the source is always a block snapshot.
// Usage:
//  docx <snapshot.json> --to <format> [--output <file>] [--assets <dir>]  - Convert (default)
//  docx convert <snapshot.json> --to <format> [...]                       - Same as above (explicit)
//  docx inspect <snapshot.json> [<transform>]   - Show an internal view (defaults to "mdast-treeviz")
//  docx check <snapshot.json> [--whiteboard]    - Report blocks the editor has not loaded yet
//  docx --list-formats                          - List formats and transforms
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix. Keys known to the configuration (whiteboard, file,
// strategy, title, page, css, assets) update it; everything else goes to the output format.
// Example:
//  docx page.json --to html --extra-css theme.css --extra-title "Weekly notes"

use docx_cli::assets::AssetDirectory;
use docx_cli::transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use docx_babel::{
    apply_resolved, publish, write_assets, AssetPolicy, Block, FormatRegistry, PublishArtifact,
    PublishSpec, ResourceResolver, TransformOptions, Transformer,
};
use docx_config::{AssetMode, DocxConfig, Loader, PdfPageSize, ResolveMode};
use log::{debug, info, warn, LevelFilter};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let has_value = args
                .get(i + 1)
                .is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn snapshot_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .help("Path to the block snapshot (JSON)")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("docx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Export online docx page snapshots to Markdown, HTML, PDF and more")
        .long_about(
            "docx converts snapshots of online docx pages (the editor's block tree, as JSON)\n\
            into Markdown and other formats.\n\n\
            Commands:\n  \
            - convert: Export a snapshot to an output format (default command)\n  \
            - inspect: View internal representations (blocks, mdast, resources)\n  \
            - check:   Report blocks that are not loaded yet\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            docx page.json --to markdown                  # Markdown on stdout\n  \
            docx page.json --to html -o page.html         # Standalone HTML page\n  \
            docx page.json --to markdown --extra-file     # Include attachments\n  \
            docx inspect page.json blocks-treeviz         # View the block tree",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
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
                .long_about(
                    "View a snapshot at different processing stages.\n\n\
                    Transforms (stage-format):\n  \
                    - blocks-treeviz:  block tree as loaded from the snapshot\n  \
                    - mdast-treeviz:   Markdown AST as tree visualization (default)\n  \
                    - mdast-json:      Markdown AST as JSON\n  \
                    - resources-json:  resources still to be fetched\n\n\
                    Examples:\n  \
                    docx inspect page.json                          # Tree visualization\n  \
                    docx inspect page.json mdast-json               # JSON output\n  \
                    docx inspect page.json resources-json --extra-file",
                )
                .arg(snapshot_arg("path"))
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply (stage-format). Defaults to 'mdast-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Export a snapshot to an output format (default command)")
                .long_about(
                    "Export a block snapshot.\n\n\
                    Supported formats:\n  \
                    - markdown: CommonMark + GFM (.md)\n  \
                    - html:     standalone page with embedded CSS (.html)\n  \
                    - json:     the Markdown AST (.json)\n  \
                    - treeviz:  tree visualization of the Markdown AST\n  \
                    - pdf:      printed by headless Chrome (.pdf, requires -o)\n\n\
                    Images and attachments are looked up in the --assets directory by token.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    docx convert page.json --to markdown                    # stdout\n  \
                    docx convert page.json --to html -o out/page.html       # Generate HTML\n  \
                    docx page.json --to markdown --assets downloads/ -o page.md",
                )
                .arg(snapshot_arg("input"))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (detected from --output when omitted)")
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
        )
}

fn main() {
    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["inspect", "convert", "check", "help"].contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_count("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or("mdast-treeviz");
            handle_inspect_command(path, transform, &config);
        }
        Some(("convert", sub_matches)) => handle_convert_command(sub_matches, &extra_params, &config),
        Some(("check", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let check_whiteboard =
                sub_matches.get_flag("whiteboard") || config.transform.whiteboard;
            handle_check_command(input, check_whiteboard);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn read_snapshot(path: &str) -> Block {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });
    Block::from_json(&source).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, transform: &str, config: &DocxConfig) {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let output = transforms::execute_transform(&source, transform, (&config.transform).into())
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    print!("{output}");
}

/// Handle the check command
fn handle_check_command(input: &str, check_whiteboard: bool) {
    let block = read_snapshot(input);
    if block.is_ready(check_whiteboard) {
        println!("ready");
        return;
    }

    let pending = block.pending_blocks();
    if pending.is_empty() {
        println!("not ready: whiteboards are still placeholders");
    } else {
        let ids: Vec<String> = pending.iter().map(u64::to_string).collect();
        println!("not ready: pending blocks {}", ids.join(", "));
    }
    std::process::exit(1);
}

/// Handle the convert command
fn handle_convert_command(
    sub_matches: &ArgMatches,
    extra_params: &HashMap<String, String>,
    config: &DocxConfig,
) {
    let input = sub_matches
        .get_one::<String>("input")
        .expect("input is required");
    let output = sub_matches.get_one::<String>("output").map(PathBuf::from);
    let registry = FormatRegistry::default();

    let to = match sub_matches.get_one::<String>("to") {
        Some(to) => to.clone(),
        None => {
            let detected = output
                .as_deref()
                .and_then(|path| registry.detect_format_from_filename(&path.to_string_lossy()));
            detected.unwrap_or_else(|| {
                eprintln!("Error: no target format. Use --to <format>");
                std::process::exit(1);
            })
        }
    };
    if let Err(e) = registry.get(&to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let block = read_snapshot(input);
    let options: TransformOptions = (&config.transform).into();
    if !block.is_ready(options.whiteboard) {
        warn!(
            "snapshot is not fully loaded; pending blocks: {:?}",
            block.pending_blocks()
        );
    }

    let mut result = Transformer::new(options).transform(&block);
    let pending: Vec<_> = result.resources().cloned().collect();
    if !pending.is_empty() {
        let assets = sub_matches.get_one::<String>("assets").map(AssetDirectory::new);
        let resolved = resolve_resources(&pending, assets, config);
        let policy = asset_policy(&resolved, output.as_deref(), config);
        apply_resolved(&mut result.root, &resolved, &policy);
    }

    let format_options = format_options_from_config(&to, config, extra_params);
    let mut spec = PublishSpec::new(&result.root, &to);
    for (key, value) in format_options {
        spec = spec.with_option(key, value);
    }
    if let Some(title) = block.page_title().filter(|_| wants_title(&to, config)) {
        spec = spec.with_title(title);
    }
    if let Some(path) = &output {
        spec = spec.with_output_path(path);
    }

    match publish(spec) {
        Ok(published) => match published.artifact {
            PublishArtifact::InMemory(text) => print!("{text}"),
            PublishArtifact::File(path) => info!("wrote {}", path.display()),
        },
        Err(e) => {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        }
    }
}

fn resolve_resources(
    pending: &[docx_babel::resources::PendingResource],
    assets: Option<AssetDirectory>,
    config: &DocxConfig,
) -> Vec<docx_babel::resources::ResolvedResource> {
    let mut resolver = config.resolve.configure(ResourceResolver::new());
    match assets {
        Some(assets) => {
            debug!("resolving {} resources from {}", pending.len(), assets.root().display());
            let assets = Arc::new(assets);
            resolver = resolver.with_images(assets.clone()).with_files(assets);
        }
        None => info!(
            "{} resources left unresolved (no --assets directory)",
            pending.len()
        ),
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to start the async runtime: {e}");
            std::process::exit(1);
        });
    runtime.block_on(resolver.resolve_all(pending))
}

/// Linked assets need a document on disk to sit next to; anything else is embedded.
fn asset_policy(
    resolved: &[docx_babel::resources::ResolvedResource],
    output: Option<&Path>,
    config: &DocxConfig,
) -> AssetPolicy {
    let Some(document) = output.filter(|_| config.convert.assets.mode == AssetMode::Linked)
    else {
        return AssetPolicy::Embed;
    };

    let base = document.parent().unwrap_or_else(|| Path::new(""));
    let dir = base.join(&config.convert.assets.dir);
    match write_assets(&dir, Some(document), resolved) {
        Ok(links) => AssetPolicy::Linked(links),
        Err(e) => {
            eprintln!("Error writing assets to '{}': {e}", dir.display());
            std::process::exit(1);
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Conversion formats:");
    for format_name in registry.list_formats() {
        let Ok(format) = registry.get(&format_name) else {
            continue;
        };
        println!("  {format_name:<10}{}", format.description());
        if !format.option_names().is_empty() {
            println!("  {:<10}options: {}", "", format.option_names().join(", "));
        }
    }

    println!("\nInspect transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> DocxConfig {
    let loader = Loader::new().with_optional_file("docx.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut DocxConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("whiteboard") {
        config.transform.whiteboard = parse_bool_arg("whiteboard", &raw);
    }
    if let Some(raw) = extra_params.remove("file") {
        config.transform.file = parse_bool_arg("file", &raw);
    }

    if let Some(raw) = extra_params.remove("strategy") {
        config.resolve.strategy = match raw.as_str() {
            "parallel" => ResolveMode::Parallel,
            "serial" => ResolveMode::Serial,
            other => {
                eprintln!("Invalid strategy '{other}' for --extra-strategy (parallel or serial)");
                std::process::exit(1);
            }
        };
    }

    if let Some(raw) = take_override(extra_params, &["page", "size"]) {
        config.convert.pdf.size = match raw.as_str() {
            "a4" => PdfPageSize::A4,
            "mobile" => PdfPageSize::Mobile,
            other => {
                eprintln!("Invalid page profile '{other}' for --extra-page (a4 or mobile)");
                std::process::exit(1);
            }
        };
    }

    if let Some(path) = take_override(extra_params, &["css", "css-path"]) {
        config.convert.html.custom_css = path;
    }

    if let Some(raw) = extra_params.remove("assets") {
        config.convert.assets.mode = match raw.as_str() {
            "embed" => AssetMode::Embed,
            "linked" => AssetMode::Linked,
            other => {
                eprintln!("Invalid asset mode '{other}' for --extra-assets (embed or linked)");
                std::process::exit(1);
            }
        };
    }

    if let Some(raw) = extra_params.get("title") {
        if let Some(enabled) = parse_bool(raw) {
            config.convert.markdown.title = enabled;
            extra_params.remove("title");
        }
    }
}

/// Options for the target format: configured values first, then remaining extras.
fn format_options_from_config(
    to: &str,
    config: &DocxConfig,
    extra_params: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut options = HashMap::new();

    if matches!(to, "html" | "pdf") {
        if let Some(path) = config.convert.html.custom_css_path() {
            let css = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Error reading CSS file '{}': {e}", path.display());
                std::process::exit(1);
            });
            options.insert("css".to_string(), css);
        }
    }
    if to == "pdf" {
        options.insert(
            "page".to_string(),
            config.convert.pdf.size.as_option().to_string(),
        );
    }

    for (key, value) in extra_params {
        options.insert(key.clone(), value.clone());
    }
    options
}

fn wants_title(to: &str, config: &DocxConfig) -> bool {
    to != "markdown" || config.convert.markdown.title
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    parse_bool(raw).unwrap_or_else(|| {
        eprintln!("Invalid boolean value '{raw}' for --extra-{flag}");
        std::process::exit(1);
    })
}
