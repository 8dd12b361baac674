//! Installer downloads.
//!
//! Streams an installer payload to disk with retries. Server errors and
//! transport failures are retried; client errors (404 and friends) are not.

use reqwest::blocking::Client;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::{Result, RuntimeError};

/// Default connect/read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per download.
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Downloads installer payloads over HTTP/HTTPS.
pub struct Downloader {
    client: Client,
    attempts: u32,
    retry_delay: Duration,
}

impl Downloader {
    /// Create a downloader with the default 30-second timeout and 5 attempts.
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_TIMEOUT, DEFAULT_ATTEMPTS, Duration::from_secs(2))
    }

    /// Create a downloader with custom timeout, attempt count and delay
    /// between attempts.
    pub fn with_settings(timeout: Duration, attempts: u32, retry_delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("matlab-runtime-installer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| RuntimeError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            attempts: attempts.max(1),
            retry_delay,
        })
    }

    /// Number of attempts per download.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Download `url` into `dest`, reporting `(received, total)` bytes.
    ///
    /// Returns the number of bytes written.
    pub fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64> {
        let mut last_error = String::new();
        for attempt in 1..=self.attempts {
            match self.try_download(url, dest, progress) {
                Ok(bytes) => return Ok(bytes),
                Err(Attempt::Fatal(err)) => return Err(err),
                Err(Attempt::Retry(message)) => {
                    tracing::warn!(
                        "Download attempt {}/{} of {} failed: {}",
                        attempt,
                        self.attempts,
                        url,
                        message
                    );
                    last_error = message;
                    if attempt < self.attempts {
                        thread::sleep(self.retry_delay);
                    }
                }
            }
        }
        Err(RuntimeError::Download {
            url: url.to_string(),
            message: format!("{} (after {} attempts)", last_error, self.attempts),
        })
    }

    fn try_download(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> std::result::Result<u64, Attempt> {
        tracing::debug!("GET {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Attempt::Retry(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(Attempt::Fatal(RuntimeError::Download {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            }));
        }
        if !status.is_success() {
            return Err(Attempt::Retry(format!("HTTP {}", status)));
        }

        let total = response.content_length();
        let file = File::create(dest).map_err(|e| Attempt::Fatal(RuntimeError::from_io(e, dest)))?;
        let mut writer = ProgressWriter {
            inner: BufWriter::new(file),
            written: 0,
            total,
            progress,
        };
        response
            .copy_to(&mut writer)
            .map_err(|e| Attempt::Retry(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| Attempt::Fatal(RuntimeError::from_io(e, dest)))?;

        if let Some(expected) = total {
            if writer.written != expected {
                return Err(Attempt::Retry(format!(
                    "truncated body: {} of {} bytes",
                    writer.written, expected
                )));
            }
        }
        Ok(writer.written)
    }
}

enum Attempt {
    Retry(String),
    Fatal(RuntimeError),
}

struct ProgressWriter<'a, W: Write> {
    inner: W,
    written: u64,
    total: Option<u64>,
    progress: &'a mut dyn FnMut(u64, Option<u64>),
}

impl<W: Write> Write for ProgressWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        (self.progress)(self.written, self.total);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Human-readable byte count, e.g. `512.0 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
