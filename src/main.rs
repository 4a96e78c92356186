use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio::FrontMatterFormat;

mod check;
mod console;
mod inspect;
mod new;

#[derive(Parser, Debug)]
#[command(
    about = "Inspect and check the content pages of a static site",
    after_help = "Run `folio <command> --help` for more info on a specific command.",
    subcommand_help_heading = "Commands",
    disable_help_subcommand = true,
    disable_help_flag = true,
)]
struct Args {
    /// Show this help message
    #[arg(short, long, action = clap::ArgAction::Help, global = true)]
    help: (),

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show everything derived from a single content file
    Inspect {
        /// Content file, relative to the site's content directory
        file: PathBuf,

        /// Path to the site directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        site: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read every page of the site and report problems
    Check {
        /// Path to the site directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        site: PathBuf,
    },
    /// Create a new draft page
    #[command(after_help = "If you don't provide a title, I'll ask you for one!")]
    New {
        /// Content file to create, relative to the site's content directory
        file: PathBuf,

        /// Path to the site directory (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        site: PathBuf,

        /// Title of the page
        #[arg(short, long)]
        title: Option<String>,

        /// Front matter format: yaml, toml or json
        #[arg(short, long, default_value = "yaml", value_parser = parse_format)]
        format: FrontMatterFormat,
    },
}

fn parse_format(name: &str) -> Result<FrontMatterFormat, String> {
    FrontMatterFormat::from_name(name).ok_or_else(|| format!("unknown front matter format `{name}`"))
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(3)
                .rgb_colors(miette::RgbColors::Preferred)
                .color(true)
                .build(),
        )
    }))
    .expect("Failed to set miette hook");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Inspect { file, site, json } => {
            crate::inspect::run_inspect(site, file, json).await?;
        }
        Command::Check { site } => {
            crate::check::run_check(site).await?;
        }
        Command::New {
            file,
            site,
            title,
            format,
        } => {
            crate::new::create_page(site, file, title, format).await?;
        }
    }

    Ok(())
}
