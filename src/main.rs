use anyhow::Result;
use clap::{App, Arg};
use quire::build::build;
use quire::config::Config;
use std::path::{Path, PathBuf};
use tracing::{error, info};

fn main() {
    let matches = App::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders the configured posts and the index page that lists them")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("PATH")
                .takes_value(true)
                .help(
                    "A project file, or a directory to start searching for \
                     `quire.yaml` from [default: current directory]",
                ),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increases logging verbosity (-v debug, -vv trace)"),
        )
        .get_matches();

    init_tracing(matches.occurrences_of("verbose"));

    let config = matches.value_of("config").map(PathBuf::from);
    if let Err(err) = run(config.as_deref()) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) if path.is_dir() => Config::from_directory(path)?,
        Some(path) => Config::from_project_file(path)?,
        None => Config::from_directory(&std::env::current_dir()?)?,
    };

    let summary = build(&config)?;
    match summary.index {
        Some(index) => info!("Built {} post(s) and {}", summary.posts, index.display()),
        None => info!("Built {} post(s)", summary.posts),
    }
    Ok(())
}

fn init_tracing(verbose: u64) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
