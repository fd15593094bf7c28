use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use docx_legal::cover::{cover_values, generate_cover};
use docx_legal::progress::ConsoleProgress;

#[derive(Parser, Debug)]
#[command(name = "docx-cover")]
#[command(about = "Generate a cover DOCX from a template", long_about = None)]
struct Args {
    /// Path to the DOCX template
    #[arg(value_name = "TEMPLATE")]
    template: PathBuf,

    /// Path for the generated DOCX
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Case number text (e.g. 'No. 1234')
    #[arg(long)]
    case_number: String,

    /// Filing name text (e.g. 'APPELLANT'S BRIEF')
    #[arg(long)]
    filing_name: String,

    /// Judge name text
    #[arg(long)]
    judge: String,

    /// Preview replacements without writing output
    #[arg(long)]
    dry_run: bool,

    /// Print progress details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> anyhow::Result<()> {
    let progress = ConsoleProgress::new(args.verbose);
    let values = cover_values(&args.case_number, &args.filing_name, &args.judge);
    let outcome = generate_cover(
        &args.template,
        &args.output,
        &values,
        args.dry_run,
        &progress,
    )?;
    if outcome.written {
        println!("Generated cover saved to {}", args.output.display());
    } else {
        print!("{}", outcome.report.render_dry_run());
    }
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
