use std::{fmt, str::FromStr};

/// A logging level - definition of how severe a message is.
///
/// Levels are totally ordered, from least to most severe:
/// `Close < Debug < Info < Warning < Error < Fatal`.
///
/// [`Level::Close`] is only useful as a threshold: it lets every message
/// through. Messages themselves are emitted at `Debug` through `Fatal`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Threshold value admitting every message.
    Close,
    /// Things that the operator probably won't want to see.
    Debug,
    /// Regular messages, normal operation.
    Info,
    /// Something didn't go to plan, but the service keeps working.
    Warning,
    /// Something went wrong and needs attention.
    Error,
    /// The process is about to stop. Never filtered.
    Fatal,
}

impl Level {
    /// The tag printed inside the line prefix, e.g. `WARN`.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Close => "CLOSE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

/// Returns whether a message at `level` passes `threshold`.
///
/// `Fatal` always passes. `Close` is a threshold only and never passes as a
/// message level.
#[inline]
pub fn should_emit(threshold: Level, level: Level) -> bool {
    match level {
        Level::Close => false,
        Level::Fatal => true,
        _ => level >= threshold,
    }
}

impl Default for Level {
    /// Only errors and fatal messages by default.
    fn default() -> Self {
        Level::Error
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when parsing an unknown level name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown log level {:?}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_ascii_lowercase().as_str() {
            "close" | "off" => Level::Close,
            "debug" | "trace" => Level::Debug,
            "info" => Level::Info,
            "warn" | "warning" => Level::Warning,
            "error" => Level::Error,
            "fatal" => Level::Fatal,
            _ => return Err(ParseLevelError(s.to_owned())),
        };
        Ok(level)
    }
}

#[cfg(test)]
mod test {
    use super::{should_emit, Level};
    use super::Level::*;

    const EMITTED: [Level; 5] = [Debug, Info, Warning, Error, Fatal];

    #[test]
    fn test_levels_are_ordered() {
        assert!(Close < Debug);
        assert!(Debug < Info);
        assert!(Info < Warning);
        assert!(Warning < Error);
        assert!(Error < Fatal);
    }

    #[test]
    fn test_default_threshold_is_error() {
        assert_eq!(Level::default(), Error);
        assert!(!should_emit(Level::default(), Warning));
        assert!(should_emit(Level::default(), Error));
    }

    #[test]
    fn test_should_emit_matches_ordering() {
        for &threshold in &[Close, Debug, Info, Warning, Error, Fatal] {
            for &level in &EMITTED {
                assert_eq!(
                    should_emit(threshold, level),
                    level >= threshold,
                    "threshold {:?}, level {:?}",
                    threshold,
                    level
                );
            }
        }
    }

    #[test]
    fn test_close_admits_everything() {
        assert!(EMITTED.iter().all(|&level| should_emit(Close, level)));
    }

    #[test]
    fn test_close_is_never_emitted() {
        for &threshold in &[Close, Debug, Info, Warning, Error, Fatal] {
            assert!(!should_emit(threshold, Close), "threshold {:?}", threshold);
        }
    }

    #[test]
    fn test_fatal_is_never_filtered() {
        assert!(should_emit(Fatal, Fatal));
        assert!(!should_emit(Fatal, Error));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("debug".parse(), Ok(Debug));
        assert_eq!("INFO".parse(), Ok(Info));
        assert_eq!("warn".parse(), Ok(Warning));
        assert_eq!("Warning".parse(), Ok(Warning));
        assert_eq!("off".parse(), Ok(Close));
        assert_eq!("fatal".parse(), Ok(Fatal));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_log_crate_levels_map_down() {
        assert_eq!(Level::from(log::Level::Trace), Debug);
        assert_eq!(Level::from(log::Level::Warn), Warning);
    }

    #[test]
    fn test_display_uses_prefix_tag() {
        assert_eq!(Warning.to_string(), "WARN");
        assert_eq!(format!("{:<5}|", Info), "INFO |");
    }
}
