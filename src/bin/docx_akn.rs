use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use docx_legal::akn::{read_sections, render_outline, write_sections, ExtractOptions};
use docx_legal::config::resolve_config;
use docx_legal::progress::ConsoleProgress;

#[derive(Parser, Debug)]
#[command(name = "docx-akn")]
#[command(about = "Extract DOCX headings into Akoma Ntoso XML", long_about = None)]
struct Args {
    /// Path to the source DOCX file
    #[arg(value_name = "DOCX")]
    docx_path: PathBuf,

    /// Path to write the Akoma Ntoso XML
    #[arg(value_name = "XML")]
    output_xml: PathBuf,

    /// Print the detected heading outline (level + text)
    #[arg(long)]
    toc: bool,

    /// Config file path (default: $DOCX_LEGAL_CONFIG, or docx-legal.toml searched upwards)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Print progress details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> anyhow::Result<()> {
    let (cfg, cfg_path) = resolve_config(args.config.as_deref())?;
    let progress = ConsoleProgress::new(args.verbose || cfg.log.verbose.unwrap_or(false));
    if let Some(p) = cfg_path.as_ref() {
        progress.info(format!("using config {}", p.display()));
    }
    let opts = ExtractOptions::from_config(&cfg.extract)?;

    let root = read_sections(&args.docx_path, &opts, &progress)?;
    if args.toc {
        print!("{}", render_outline(&root));
    }
    write_sections(&root, &args.output_xml, &opts, &progress)?;
    println!("Akoma Ntoso XML written to {}", args.output_xml.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}
