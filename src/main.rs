use std::io::{self, BufRead};
use std::path::PathBuf;

use eyre::{Result, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, Collection, Command, OutputFormat};
use ytsum::backend::HttpBackend;
use ytsum::config::Config;
use ytsum::error::SummarizeError;
use ytsum::history::HistoryStore;
use ytsum::output;
use ytsum::record::SummaryRecord;
use ytsum::storage::FileStore;
use ytsum::workflow::Controller;
use ytsum::{SummaryLength, SummaryOptions, SummaryStyle};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn build_after_help(config: &Config) -> String {
    format!(
        "\nBACKEND:\n  {}\n\nConfig file:  {}\nSummaries in: {}\nLogs in:      {}",
        config.backend_url(),
        ytsum::config::config_path().display(),
        config.storage_dir().display(),
        log_dir().join("ytsum.log").display(),
    )
}

fn read_urls(url: Option<String>) -> Result<Vec<String>> {
    if let Some(url) = url {
        return Ok(vec![url]);
    }
    let stdin = io::stdin();
    let lines = stdin.lock().lines().collect::<Result<Vec<_>, _>>()?;
    Ok(lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

fn render(record: &SummaryRecord, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => output::render_text(record),
        OutputFormat::Details => output::render_details(record),
        OutputFormat::Json => output::render_json(record),
    }
}

#[allow(clippy::too_many_arguments)]
async fn summarize(
    config: &Config,
    store: HistoryStore<FileStore>,
    url: Option<String>,
    length: Option<SummaryLength>,
    style: Option<SummaryStyle>,
    format: OutputFormat,
    output: Option<PathBuf>,
    favorite: bool,
    backend_url: Option<String>,
    verbose: bool,
) -> Result<()> {
    let defaults = config.options();
    let options = SummaryOptions {
        length: length.unwrap_or(defaults.length),
        style: style.unwrap_or(defaults.style),
    };

    let backend_url = backend_url.as_deref().unwrap_or(config.backend_url());
    let backend = HttpBackend::new(backend_url, config.timeout())?;
    if verbose {
        eprintln!("Backend: {} (timeout {:?})", backend.endpoint(), config.timeout());
    }
    let controller = Controller::new(backend, store);

    let urls = read_urls(url)?;
    if urls.is_empty() {
        bail!("{}\n\nUsage: ytsum summarize <URL>\n       echo <URL> | ytsum summarize", SummarizeError::EmptyInput);
    }

    let mut failed = 0;
    let mut invalid = 0;
    let mut written = 0;
    for url in &urls {
        match controller.submit(url, options).await {
            Ok(record) => {
                if verbose {
                    eprintln!("Saved {} ({} / {})", record.id, record.summary_length, record.summary_style);
                }
                println!("{}", render(&record, format));

                if let Some(ref path) = output {
                    output::write_summary(path, &record, written > 0)?;
                    written += 1;
                    if verbose {
                        eprintln!("Summary written to: {}", path.display());
                    }
                }

                if favorite && controller.toggle_favorite(&record.id) == Some(true) && verbose {
                    eprintln!("Added {} to favorites", record.id);
                }
            }
            Err(e) => {
                debug!("{url}: {e:?}");
                eprintln!("{url}: {e}");
                failed += 1;
                if e.is_validation() {
                    invalid += 1;
                }
            }
        }
    }

    if failed > 0 {
        let hint = if invalid > 0 {
            "\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID"
        } else {
            ""
        };
        bail!("{failed} of {} summaries failed{hint}", urls.len());
    }
    Ok(())
}

fn list(records: &[SummaryRecord], store: &HistoryStore<FileStore>, json: bool, empty: &str) {
    if json {
        println!("{}", output::render_json_list(records));
    } else if records.is_empty() {
        println!("{empty}");
    } else {
        for record in records {
            println!("{}", output::render_list_line(record, store.is_favorite(&record.id)));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    let after_help = build_after_help(&config);
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    if cli.verbose {
        let config_path = ytsum::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("Storage: {}", config.storage_dir().display());
    }

    let mut store = HistoryStore::load_all(FileStore::new(config.storage_dir()));

    match cli.command {
        Command::Summarize {
            url,
            length,
            style,
            format,
            output,
            favorite,
            backend,
        } => {
            summarize(&config, store, url, length, style, format, output, favorite, backend, cli.verbose).await?;
        }
        Command::History { json } => {
            list(store.history(), &store, json, "No summaries yet");
        }
        Command::Favorites { json } => {
            list(store.favorites(), &store, json, "No favorites yet");
        }
        Command::Favorite { id } => {
            let Some(record) = store.find(&id).cloned() else {
                bail!("no summary with id {id}");
            };
            if store.toggle_favorite(&record) {
                println!("Added {id} to favorites");
            } else {
                println!("Removed {id} from favorites");
            }
        }
        Command::Show { id, format } => {
            let Some(record) = store.find(&id) else {
                bail!("no summary with id {id}");
            };
            println!("{}", render(record, format));
        }
        Command::Clear { collection } => match collection {
            Collection::History => {
                let count = store.history().len();
                store.clear_history();
                println!("Cleared {count} history entries");
            }
            Collection::Favorites => {
                let count = store.favorites().len();
                store.clear_favorites();
                println!("Cleared {count} favorites");
            }
        },
    }

    Ok(())
}
