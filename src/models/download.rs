use std::{
    fs::File,
    io::{ErrorKind, Read, Write},
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{
    blocking::{Client, Response},
    header::CONTENT_LENGTH,
    redirect::Policy,
    StatusCode,
};

const CHUNK_SIZE: usize = 8 * 1024;
const BAR_TEMPLATE: &str = "[{elapsed_precise}] [{bar:60.cyan/blue}] {bytes}/{total_bytes} ({percent}%)";

/// Something that can place the body of `url` at `destination`.
///
/// `Ok(true)` means the whole declared body was written; `Ok(false)` means
/// the server refused or the body did not match its declared length.
pub trait Fetch {
    fn fetch(&mut self, url: &str, destination: &Path) -> Result<bool>;
}

pub struct HttpFetcher {
    client: Client,
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            show_progress: false,
        })
    }

    #[must_use]
    pub fn with_progress_bar(mut self) -> Self {
        self.show_progress = true;
        self
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&mut self, url: &str, destination: &Path) -> Result<bool> {
        let bar = if self.show_progress {
            download_bar()?
        } else {
            ProgressBar::hidden()
        };
        fetch_tracked(&self.client, url, destination, &bar)
    }
}

fn download_bar() -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .context("progress bar template")?
        .progress_chars("#>-");
    let bar = ProgressBar::new(0);
    bar.set_style(style);
    Ok(bar)
}

fn fetch_tracked(client: &Client, url: &str, destination: &Path, bar: &ProgressBar) -> Result<bool> {
    let result = fetch_with_progress(client, url, destination, |written, total| {
        if total > 0 {
            bar.set_length(total);
        }
        bar.set_position(written);
    });
    bar.finish();
    result
}

pub fn build_client() -> Result<Client> {
    Client::builder()
        .redirect(Policy::none())
        .timeout(None::<Duration>)
        .build()
        .context("create http client")
}

pub fn fetch(url: &str, destination: &Path) -> Result<bool> {
    let client = build_client()?;
    fetch_with_progress(&client, url, destination, |_, _| {})
}

pub fn fetch_with_progress<F>(
    client: &Client,
    url: &str,
    destination: &Path,
    mut progress: F,
) -> Result<bool>
where
    F: FnMut(u64, u64),
{
    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("request {url}"))?;

    if response.status() != StatusCode::OK {
        tracing::warn!("{url} answered {}", response.status());
        return Ok(false);
    }

    let total = declared_length(&response);
    let written = write_body(&mut response, destination, total, &mut progress)?;
    if written != total {
        tracing::warn!("received {written} bytes from {url}, server declared {total}");
    }
    Ok(written == total)
}

fn declared_length(response: &Response) -> u64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

fn write_body<R, F>(body: &mut R, destination: &Path, total: u64, progress: &mut F) -> Result<u64>
where
    R: Read,
    F: FnMut(u64, u64),
{
    let mut file = File::create(destination)
        .with_context(|| format!("create {}", destination.display()))?;
    let mut written = 0u64;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => {
                tracing::warn!("download stream ended early: {error}");
                break;
            }
        };
        file.write_all(&buffer[..read])
            .context("write download chunk")?;
        written += read as u64;
        progress(written, total);
    }
    file.flush().context("flush download")?;
    Ok(written)
}
