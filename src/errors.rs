use std::{error, fmt, io};

/// Error returned when a line could not be emitted.
#[derive(Debug)]
pub enum LogError {
    /// Writing to the console or the log file failed.
    ///
    /// Every sink is still attempted; this holds the first failure.
    Io(io::Error),
    /// A `Display` implementation in the message, or the timestamp pattern,
    /// returned an error. Nothing was written.
    Format,
}

/// Convenience error that combines all possible errors which can occur when
/// setting up logging.
#[derive(Debug)]
pub enum InitError {
    /// Creating the log directory or opening the log file failed.
    Io(io::Error),
    /// The configured time format is not a valid strftime pattern.
    TimeFormat(String),
    /// This logger already has a file sink.
    AlreadyInitialized,
    /// [`init`](crate::init) was called after the process-wide logger was
    /// already created.
    GlobalAlreadySet,
    /// The `log` crate's global logger was already set.
    SetLogger(log::SetLoggerError),
}

impl From<io::Error> for LogError {
    fn from(error: io::Error) -> Self {
        LogError::Io(error)
    }
}

impl From<fmt::Error> for LogError {
    fn from(_: fmt::Error) -> Self {
        LogError::Format
    }
}

impl From<io::Error> for InitError {
    fn from(error: io::Error) -> Self {
        InitError::Io(error)
    }
}

impl From<log::SetLoggerError> for InitError {
    fn from(error: log::SetLoggerError) -> Self {
        InitError::SetLogger(error)
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LogError::Io(ref e) => write!(f, "IO error while writing log line: {}", e),
            LogError::Format => f.write_str("formatting error while building log line"),
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InitError::Io(ref e) => write!(f, "IO error while opening log file: {}", e),
            InitError::TimeFormat(ref pattern) => {
                write!(f, "invalid time format for log file name: {:?}", pattern)
            }
            InitError::AlreadyInitialized => f.write_str("log file already set up for this logger"),
            InitError::GlobalAlreadySet => f.write_str("process-wide logger already initialized"),
            InitError::SetLogger(ref e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for LogError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            LogError::Io(ref e) => Some(e),
            LogError::Format => None,
        }
    }
}

impl error::Error for InitError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            InitError::Io(ref e) => Some(e),
            InitError::SetLogger(ref e) => Some(e),
            _ => None,
        }
    }
}
