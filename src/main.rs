/*!
# AS3 Docset CLI

Command-line interface for the ActionScript 3 reference to docset converter.
*/

use anyhow::Result;
use as3_docset::cli_common::{
    self, format_duration, print_error, print_header, print_info, print_success, print_warning,
    CommonArgs, ConfigArgs, OutputFormat, OutputWriter, ProgressObserver,
};
use as3_docset::docset::list_pages;
use as3_docset::{is_validation_error, BuildSummary, DocsetBuilder, IndexingOutcome};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "as3-docset",
    version = env!("CARGO_PKG_VERSION"),
    about = "Converts the ActionScript 3.0 reference into an offline docset"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the docset bundle
    Build {
        /// Unpacked reference directory (contains index.html)
        #[arg(short, long)]
        source: PathBuf,

        /// Bundle directory (defaults to <source>/as3.docset)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Validate the source and list the pages found in the index pages
    Pages {
        #[arg(short, long)]
        source: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the tokens extracted from a single page
    Inspect {
        #[arg(short, long)]
        source: PathBuf,

        /// Page path relative to the source directory
        page: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli_common::init_logging(cli.common.log_level()) {
        eprintln!("{}", e);
    }

    if let Err(error) = run(&cli) {
        // validation problems are a single line; anything else keeps the cause chain
        if is_validation_error(&error) {
            print_error(&format!("{:#}", error));
        } else {
            print_error(&format!("{:?}", error));
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Build {
            source,
            output,
            config,
        } => build(&cli.common, source, output.clone(), config),
        Commands::Pages { source, config } => pages(&cli.common, source, config),
        Commands::Inspect {
            source,
            page,
            config,
        } => inspect(&cli.common, source, page, config),
    }
}

fn build(
    common: &CommonArgs,
    source: &Path,
    output: Option<PathBuf>,
    config_args: &ConfigArgs,
) -> Result<()> {
    let config = config_args.load()?;
    let builder = DocsetBuilder::new(config, source, output)?;

    if common.should_print() && common.format == OutputFormat::Text {
        print_header(
            "as3-docset",
            env!("CARGO_PKG_VERSION"),
            "ActionScript 3 reference to docset",
        );
        print_info(&format!("Source: {}", source.display()));
        print_info(&format!("Bundle: {}", builder.layout().root.display()));
    }

    let observer = ProgressObserver::new(common.show_progress());
    let summary = builder.build_with(&observer)?;

    match common.format {
        OutputFormat::Json => OutputWriter::stdout(OutputFormat::Json).write_object(&summary),
        OutputFormat::Text if common.should_print() => {
            report_summary(&summary);
            Ok(())
        }
        OutputFormat::Text => Ok(()),
    }
}

fn report_summary(summary: &BuildSummary) {
    print_success(&format!(
        "Wrote {} pages ({} with tokens, {} tokens) in {}",
        summary.pages_written,
        summary.pages_with_tokens,
        summary.total_tokens,
        format_duration(summary.duration)
    ));
    print_info(&format!(
        "Anchors inserted: {}, unresolved: {}",
        summary.anchors_inserted, summary.anchors_missed
    ));

    if !summary.missing_pages.is_empty() {
        print_warning(&format!(
            "{} indexed pages do not exist in the source",
            summary.missing_pages.len()
        ));
    }
    for patch in &summary.assets.patches_missed {
        print_warning(&format!("CSS patch not applied: {}", patch));
    }

    match &summary.indexing {
        IndexingOutcome::Disabled => print_info("Indexing skipped"),
        IndexingOutcome::NotFound => {
            print_warning("docsetutil not found; run it on the bundle to finish indexing")
        }
        IndexingOutcome::Succeeded => print_success("Docset indexed"),
        IndexingOutcome::Failed { code } => print_warning(&format!(
            "Indexing failed (exit code {})",
            code.map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string())
        )),
    }

    print_success(&format!("Done: {}", summary.output.display()));
}

fn pages(common: &CommonArgs, source: &Path, config_args: &ConfigArgs) -> Result<()> {
    let config = config_args.load()?;
    let pages = list_pages(&config, source)?;

    let mut writer = OutputWriter::stdout(common.format);
    match writer.format() {
        OutputFormat::Json => writer.write_object(&pages)?,
        OutputFormat::Text => {
            for page in &pages {
                writer.write_line(page)?;
            }
            if common.should_print() {
                print_info(&format!("{} pages", pages.len()));
            }
        }
    }
    writer.flush()
}

fn inspect(
    common: &CommonArgs,
    source: &Path,
    page: &str,
    config_args: &ConfigArgs,
) -> Result<()> {
    let config = config_args.load()?;
    let builder = DocsetBuilder::new(config, source, None)?;
    let tokens = builder.inspect_page(page)?;

    let mut writer = OutputWriter::stdout(common.format);
    match writer.format() {
        OutputFormat::Json => writer.write_object(&tokens)?,
        OutputFormat::Text => {
            writer.write_header(page)?;
            let rows: Vec<Vec<String>> = tokens
                .iter()
                .map(|token| {
                    vec![
                        token.reference.clone(),
                        token.anchor.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            writer.write_table(&["reference", "anchor"], &rows)?;
        }
    }
    writer.flush()
}
