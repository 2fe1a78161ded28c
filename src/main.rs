use std::{
    env,
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use model_fetch::{
    core::{Invocation, Settings},
    models::{ArtifactResolver, Catalog, HttpFetcher},
    output::{write_catalog, write_check_report},
};
use tracing::metadata::LevelFilter;

fn setup_logging() {
    let filter = env::var("MODEL_FETCH_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::INFO);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(invocation: Invocation) -> Result<()> {
    let settings = Settings::load()?;
    let catalog_path = settings.catalog_path()?;
    let catalog = Catalog::from_path(&catalog_path)
        .with_context(|| format!("load catalog {}", catalog_path.display()))?;

    let mut stdout = io::stdout().lock();
    match invocation {
        Invocation::ListCatalog => write_catalog(&mut stdout, &catalog)?,
        Invocation::Check => {
            write_check_report(&mut stdout, &catalog, &settings.legacy_storage_dir)?
        }
        Invocation::Rewrite(args) => {
            let fetcher = HttpFetcher::new()?.with_progress_bar();
            let mut resolver = ArtifactResolver::new(
                &catalog,
                settings.endpoint(),
                fetcher,
                settings.storage_dir.clone(),
            );
            let rewritten = resolver.rewrite_args(&args)?;
            let rendered =
                serde_json::to_string(&rewritten).context("serialize rewritten arguments")?;
            writeln!(stdout, "{rendered}")?;
        }
    }
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    setup_logging();

    match run(Invocation::from_args(env::args().skip(1))) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
