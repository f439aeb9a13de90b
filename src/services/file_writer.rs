//! Destination file output: templated countdown values and literal messages

use std::{fs, io, path::{Path, PathBuf}};
use thiserror::Error;
use tracing::debug;

use crate::state::TimeSpan;

pub const HOURS_TOKEN: &str = "{hh}";
pub const MINUTES_TOKEN: &str = "{mm}";
pub const SECONDS_TOKEN: &str = "{ss}";

/// Template used when none has been configured
pub const DEFAULT_FORMAT: &str = "{hh}:{mm}:{ss}";

#[derive(Debug, Error)]
#[error("unable to write {path}: {source}")]
pub struct FileWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Substitute `{hh}`, `{mm}` and `{ss}` in `template` with the zero-padded components of `span`.
///
/// Padding is a minimum width, so 100 hours renders as `100`.
pub fn format_time_span(template: &str, span: &TimeSpan) -> String {
    template
        .replace(HOURS_TOKEN, &format!("{:02}", span.hours))
        .replace(MINUTES_TOKEN, &format!("{:02}", span.minutes))
        .replace(SECONDS_TOKEN, &format!("{:02}", span.seconds))
}

/// Write `span` to `path` using `template`, replacing the previous contents
pub fn write_time_span(path: &Path, template: &str, span: &TimeSpan) -> Result<(), FileWriteError> {
    write_literal(path, &format_time_span(template, span))
}

/// Write `contents` verbatim to `path`, replacing the previous contents
pub fn write_literal(path: &Path, contents: &str) -> Result<(), FileWriteError> {
    fs::write(path, encode_latin1(contents)).map_err(|source| FileWriteError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {:?} to {}", contents, path.display());
    Ok(())
}

/// One byte per character; anything outside Latin-1 becomes `?`
fn encode_latin1(contents: &str) -> Vec<u8> {
    contents
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
