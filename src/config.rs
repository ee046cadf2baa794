use std::{
    borrow::Cow,
    fmt::{self, Write},
    fs,
    io,
    path::{Path, PathBuf},
};

use chrono::{
    format::{Item, StrftimeItems},
    DateTime, TimeZone,
};

use crate::InitError;

/// Where and under which name [`Logger::setup`] creates the log file.
///
/// The file is named `<base_name>-<time>.<extension>`, where `<time>` is the
/// local time at setup formatted with the strftime pattern `time_format`.
///
/// ```
/// let config = lvlog::Config::new("logs", "godis")
///     .extension("log")
///     .time_format("%Y-%m-%d");
/// ```
///
/// [`Logger::setup`]: crate::Logger::setup
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Directory holding the log file. Created if missing.
    #[cfg_attr(feature = "serde", serde(rename = "path"))]
    pub directory: PathBuf,
    /// File name part before the timestamp.
    #[cfg_attr(feature = "serde", serde(rename = "name"))]
    pub base_name: String,
    /// File extension, without the dot.
    #[cfg_attr(feature = "serde", serde(rename = "ext", default = "default_extension"))]
    pub extension: Cow<'static, str>,
    /// strftime pattern for the timestamp in the file name.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "time-format", default = "default_time_format")
    )]
    pub time_format: Cow<'static, str>,
}

const DEFAULT_EXTENSION: &str = "log";
const DEFAULT_TIME_FORMAT: &str = "%Y%m%d";

#[cfg(feature = "serde")]
fn default_extension() -> Cow<'static, str> {
    DEFAULT_EXTENSION.into()
}

#[cfg(feature = "serde")]
fn default_time_format() -> Cow<'static, str> {
    DEFAULT_TIME_FORMAT.into()
}

impl Config {
    /// Creates a configuration with extension `log` and time format `%Y%m%d`.
    pub fn new(directory: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Config {
            directory: directory.into(),
            base_name: base_name.into(),
            extension: DEFAULT_EXTENSION.into(),
            time_format: DEFAULT_TIME_FORMAT.into(),
        }
    }

    /// Sets the file extension. Default is `log`.
    pub fn extension<T: Into<Cow<'static, str>>>(mut self, extension: T) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the strftime pattern for the file name timestamp. Default is
    /// `%Y%m%d`.
    pub fn time_format<T: Into<Cow<'static, str>>>(mut self, time_format: T) -> Self {
        self.time_format = time_format.into();
        self
    }

    /// The log file name for the current local time.
    pub fn file_name(&self) -> Result<String, InitError> {
        self.file_name_at(&chrono::Local::now())
    }

    /// The log file name for the given time.
    pub fn file_name_at<Tz>(&self, time: &DateTime<Tz>) -> Result<String, InitError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut name = String::new();
        write!(
            name,
            "{}-{}.{}",
            self.base_name,
            time.format(&self.time_format),
            self.extension
        )
        .map_err(|_| InitError::TimeFormat(self.time_format.to_string()))?;
        Ok(name)
    }
}

/// Checks that `pattern` is a valid strftime pattern.
pub(crate) fn check_time_format(pattern: &str) -> Result<(), InitError> {
    if StrftimeItems::new(pattern).any(|item| item == Item::Error) {
        return Err(InitError::TimeFormat(pattern.to_owned()));
    }
    Ok(())
}

/// Opens `file_name` inside `dir` for appending, creating both if needed.
///
/// Returns the full path of the opened file.
pub fn open_or_create(file_name: &str, dir: &Path) -> io::Result<(PathBuf, fs::File)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let file = crate::log_file(&path)?;
    Ok((path, file))
}
