//! Markclip CLI - Clip HTML pages to Markdown files

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use markclip_lib::{
    Article, ClipError, Clipper, FetchError, FileSettings, FsDownloader, HttpFetcher, SettingsStore,
};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Base URI used for pages read from stdin without `--base-url`.
const STDIN_BASE: &str = "about:blank";

#[derive(Parser)]
#[command(name = "markclip", version)]
#[command(about = "Clip HTML pages to Markdown files", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Settings file (YAML, or JSON by extension) [default: $MARKCLIP_CONFIG or the user config dir]
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an HTML page to Markdown
    Convert {
        /// The HTML file to clip (use "-" to read from stdin)
        #[arg(value_name = "HTML")]
        html: PathBuf,

        /// URL the page was loaded from [default: the file's URL]
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Directory clips are written under
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Download images next to the clip
        #[arg(long, conflicts_with_all = ["no_download_images", "stdout"])]
        download_images: bool,

        /// Keep remote image URLs
        #[arg(long)]
        no_download_images: bool,

        /// Print the Markdown instead of writing files
        #[arg(long)]
        stdout: bool,

        /// HTML fragment to convert instead of the page body
        #[arg(long, value_name = "FILE")]
        selection: Option<PathBuf>,
    },

    /// Print a Markdown link for each page
    Link {
        /// The HTML files to link
        #[arg(value_name = "HTML", required = true)]
        html: Vec<PathBuf>,

        /// URL the pages were loaded from [default: each file's URL]
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },

    /// Print the effective options as YAML
    Options,

    /// Flip a boolean setting and print its new value
    Toggle {
        /// Setting key, e.g. "downloadImages"
        #[arg(value_name = "KEY")]
        key: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Clip(#[from] ClipError),

    #[error("cannot set up image fetching: {0}")]
    Fetcher(#[from] FetchError),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot build a file URL for {0}")]
    FileUrl(PathBuf),

    #[error("cannot serialize options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("'{0}' is not a boolean setting")]
    UnknownSetting(String),
}

/// Log filter for a `-v` count; `RUST_LOG` takes precedence when valid.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,markclip_lib=info",
        2 => "info,markclip_lib=debug",
        _ => "debug,markclip_lib=trace",
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|filter| EnvFilter::try_new(filter).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        let detailed = verbose >= 3;
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_file(detailed)
                    .with_line_number(detailed)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn settings(config: Option<PathBuf>) -> Result<FileSettings, CliError> {
    match config {
        Some(path) => Ok(FileSettings::new(path)),
        None => Ok(FileSettings::from_env()?),
    }
}

async fn read_input(path: &Path) -> Result<String, CliError> {
    let read = if path.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .map(|_| text)
    } else {
        tokio::fs::read_to_string(path).await
    };
    read.map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// `--base-url` when given, else the `file://` URL of `path`.
fn base_uri(path: &Path, base_url: Option<&str>) -> Result<String, CliError> {
    if let Some(base_url) = base_url {
        return Ok(base_url.to_string());
    }
    if path.as_os_str() == "-" {
        return Ok(STDIN_BASE.to_string());
    }
    let absolute = std::path::absolute(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|()| CliError::FileUrl(absolute))
}

async fn load_article(path: &Path, base_url: Option<&str>) -> Result<Article, CliError> {
    let html = read_input(path).await?;
    Ok(Article::from_html(&html, &base_uri(path, base_url)?))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let clipper = Clipper::new(settings(cli.config)?, HttpFetcher::new()?);

    match cli.command {
        Commands::Convert {
            html,
            base_url,
            output,
            download_images,
            no_download_images,
            stdout,
            selection,
        } => {
            let mut article = load_article(&html, base_url.as_deref()).await?;
            if let Some(selection) = selection {
                article = article.with_selection(read_input(&selection).await?);
            }

            let download = if download_images {
                Some(true)
            } else if no_download_images || stdout {
                Some(false)
            } else {
                None
            };
            let conversion = clipper.convert(&article, download).await?;

            if stdout {
                println!("{}", conversion.markdown);
                return Ok(());
            }

            let title = clipper.format_title(&article).await?;
            let folder = clipper.format_clips_folder(&article).await?;
            clipper
                .save(conversion, &title, &folder, &FsDownloader::new(&output))
                .await?;
            println!("{}", output.join(format!("{folder}{title}.md")).display());
        }

        Commands::Link { html, base_url } => {
            let mut articles = Vec::with_capacity(html.len());
            for path in &html {
                articles.push(load_article(path, base_url.as_deref()).await?);
            }
            let text = match articles.as_slice() {
                [article] => clipper.markdown_link(article).await?,
                articles => clipper.link_list(articles).await?,
            };
            println!("{text}");
        }

        Commands::Options => {
            let options = clipper.options().await?;
            print!("{}", serde_yaml::to_string(&options)?);
        }

        Commands::Toggle { key } => match clipper.settings().toggle(&key).await? {
            Some(value) => println!("{key}: {value}"),
            None => return Err(CliError::UnknownSetting(key)),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    tracing::debug!("markclip starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
