use std::{
    borrow::Cow,
    fmt::{self, Write as _},
    io::{self, BufWriter, Write},
    path::PathBuf,
    process,
    sync::{Mutex, MutexGuard},
};

use log::Log;

use crate::{
    config::{check_time_format, open_or_create, Config},
    prefix::{self, CallSite},
    sink::Sink,
    should_emit, InitError, Level, LogError,
};

/// Timestamp decoration placed between the prefix and the message: date and
/// time, no sub-second precision.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A leveled logger writing to the console and, after [`setup`], to a log
/// file.
///
/// Every emission (threshold check, prefix, formatting and the write to all
/// sinks) happens under one lock, so lines from concurrent callers never
/// interleave.
///
/// Lines look like:
///
/// ```text
/// [ERROR][handler.rs:87] 2024/03/09 17:04:05 connection reset by 10.0.0.7
/// ```
///
/// Example usage:
///
/// ```
/// use lvlog::{Level, Logger};
///
/// let logger = Logger::new().level(Level::Info);
///
/// lvlog::info!(logger: logger, "listening on {}", "127.0.0.1:6399").ok();
/// lvlog::debug!(logger: logger, "filtered out").ok();
/// ```
///
/// A custom timestamp is checked when it is set:
///
/// ```
/// use lvlog::{InitError, Logger};
///
/// let logger = Logger::new().timestamp_format(Some("%H:%M:%S"))?;
/// lvlog::error!(logger: logger, "stamped with the time of day").ok();
/// assert!(Logger::new().timestamp_format(Some("%Y-%")).is_err());
/// # Ok::<(), InitError>(())
/// ```
///
/// [`setup`]: #method.setup
pub struct Logger {
    state: Mutex<State>,
}

struct State {
    threshold: Level,
    timestamp_format: Option<Cow<'static, str>>,
    sink: Sink,
    /// Prefix installed by the current emission.
    prefix: String,
    /// Reused line buffer.
    line: String,
}

impl Logger {
    /// Creates a logger writing to stdout, with threshold [`Level::Error`]
    /// and the default timestamp decoration.
    pub fn new() -> Self {
        Logger::with_console(io::stdout())
    }

    /// Creates a logger using `console` in place of stdout.
    pub fn with_console<W: Write + Send + 'static>(console: W) -> Self {
        Logger {
            state: Mutex::new(State {
                threshold: Level::default(),
                timestamp_format: Some(DEFAULT_TIMESTAMP_FORMAT.into()),
                sink: Sink::new(Box::new(console)),
                prefix: String::new(),
                line: String::new(),
            }),
        }
    }

    /// Sets the initial threshold.
    #[inline]
    pub fn level(mut self, level: Level) -> Self {
        self.state_mut().threshold = level;
        self
    }

    /// Sets the strftime pattern for the timestamp written after the prefix,
    /// or `None` to leave lines undecorated.
    ///
    /// Default is [`DEFAULT_TIMESTAMP_FORMAT`]. Fails with
    /// [`InitError::TimeFormat`] if `format` is not a valid pattern.
    pub fn timestamp_format<T>(mut self, format: Option<T>) -> Result<Self, InitError>
    where
        T: Into<Cow<'static, str>>,
    {
        let format = format.map(Into::into);
        if let Some(pattern) = &format {
            check_time_format(pattern)?;
        }
        self.state_mut().timestamp_format = format;
        Ok(self)
    }

    /// Changes the threshold of a running logger.
    ///
    /// Messages below the new threshold are dropped from the next emission
    /// on. Lines already written are unaffected.
    pub fn set_level(&self, level: Level) {
        self.lock().threshold = level;
    }

    /// The current threshold.
    pub fn threshold(&self) -> Level {
        self.lock().threshold
    }

    /// Whether a message at `level` would currently be written.
    pub fn enabled_for(&self, level: Level) -> bool {
        should_emit(self.lock().threshold, level)
    }

    /// Opens the log file described by `config` and writes every following
    /// line to it as well as to the console.
    ///
    /// The file `<base_name>-<time>.<extension>` is created in append mode
    /// under `config.directory`, which is created if missing. The sink is
    /// swapped while holding the emission lock.
    ///
    /// A logger opens a file at most once; later calls fail with
    /// [`InitError::AlreadyInitialized`] without touching the filesystem.
    ///
    /// Returns the path of the opened file.
    pub fn setup(&self, config: &Config) -> Result<PathBuf, InitError> {
        let mut state = self.lock();
        if state.sink.file_attached() {
            return Err(InitError::AlreadyInitialized);
        }

        let file_name = config.file_name()?;
        let (path, file) = open_or_create(&file_name, &config.directory)?;

        state.sink.attach_file(Box::new(BufWriter::new(file)));
        Ok(path)
    }

    /// Adds `writer` as the second destination, next to the console.
    ///
    /// Subject to the same once-only rule as [`setup`](#method.setup).
    pub fn attach_file<W: Write + Send + 'static>(&self, writer: W) -> Result<(), InitError> {
        let mut state = self.lock();
        if state.sink.file_attached() {
            return Err(InitError::AlreadyInitialized);
        }
        state.sink.attach_file(Box::new(writer));
        Ok(())
    }

    /// Whether lines currently also go to a log file.
    pub fn has_file(&self) -> bool {
        self.lock().sink.has_file()
    }

    /// Flushes and releases the log file; later lines go to the console
    /// only.
    ///
    /// Meant for an orderly shutdown. The file is not reopened by a later
    /// [`setup`](#method.setup).
    pub fn close(&self) -> Result<(), LogError> {
        self.lock().sink.detach_file()?;
        Ok(())
    }

    /// Emits `args` at `level`, annotated with the caller's location.
    #[track_caller]
    #[inline]
    pub fn emit(&self, level: Level, args: fmt::Arguments) -> Result<(), LogError> {
        self.emit_at(level, Some(CallSite::caller()), args)
    }

    /// Emits `args` at `level` with an explicit call site.
    ///
    /// Without a call site the prefix is just `[LEVEL] `.
    pub fn emit_at(
        &self,
        level: Level,
        site: Option<CallSite>,
        args: fmt::Arguments,
    ) -> Result<(), LogError> {
        let mut guard = self.lock();
        let state = &mut *guard;

        if !should_emit(state.threshold, level) {
            return Ok(());
        }

        state.prefix.clear();
        prefix::write_prefix(&mut state.prefix, level, site);

        state.line.clear();
        let built = build_line(
            &mut state.line,
            state.timestamp_format.as_deref(),
            &state.prefix,
            args,
        );
        if built.is_err() {
            state.line.clear();
            return Err(LogError::Format);
        }

        state.sink.write_line(state.line.as_bytes())?;
        Ok(())
    }

    /// Emits `args` at [`Level::Debug`].
    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.emit(Level::Debug, args)
    }

    /// Emits `args` at [`Level::Info`].
    #[track_caller]
    pub fn info(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.emit(Level::Info, args)
    }

    /// Emits `args` at [`Level::Warning`].
    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.emit(Level::Warning, args)
    }

    /// Emits `args` at [`Level::Error`].
    #[track_caller]
    pub fn error(&self, args: fmt::Arguments) -> Result<(), LogError> {
        self.emit(Level::Error, args)
    }

    /// Emits `args` at [`Level::Fatal`], then exits the process with status 1.
    ///
    /// Fatal messages pass any threshold. Write failures are reported on
    /// stderr since there is no caller left to return them to.
    #[track_caller]
    pub fn fatal(&self, args: fmt::Arguments) -> ! {
        let site = CallSite::caller();
        if let Err(error) = self.emit_at(Level::Fatal, Some(site), args) {
            backup_logging(Level::Fatal, Some(site), &args, &error);
        }
        if let Err(error) = self.lock().sink.flush() {
            backup_logging(Level::Fatal, Some(site), &args, &error.into());
        }
        process::exit(1)
    }

    fn lock(&self) -> MutexGuard<State> {
        // a panic while logging must not disable logging for everyone else
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(|e| e.into_inner())
    }
}

fn build_line(
    line: &mut String,
    timestamp_format: Option<&str>,
    prefix: &str,
    args: fmt::Arguments,
) -> fmt::Result {
    line.push_str(prefix);
    if let Some(format) = timestamp_format {
        write!(line, "{} ", chrono::Local::now().format(format))?;
    }
    line.write_fmt(args)?;
    if !line.ends_with('\n') {
        line.push('\n');
    }
    Ok(())
}

fn backup_logging(level: Level, site: Option<CallSite>, args: &fmt::Arguments, error: &LogError) {
    let origin = match site {
        Some(site) => format!("{}:{}", site.file(), site.line()),
        None => "unknown".to_owned(),
    };
    let second = write!(
        io::stderr(),
        "Error performing logging.\
         \n\tattempted to log: {}{}\
         \n\torigin location: {}\
         \n\tlogging error: {}\n",
        prefix::format_prefix(level, site),
        args,
        origin,
        error
    );

    if let Err(second_error) = second {
        panic!(
            "Error performing stderr logging after error occurred during regular logging.\
             \n\tattempted to log: {}\
             \n\tlogging error: {}\
             \n\tstderr error: {}",
            args, error, second_error,
        );
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Logger")
            .field("threshold", &state.threshold)
            .field("timestamp_format", &state.timestamp_format)
            .field("sink", &state.sink)
            .finish()
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.enabled_for(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        let site = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(CallSite::new(file, line)),
            _ => None,
        };

        if let Err(error) = self.emit_at(level, site, *record.args()) {
            backup_logging(level, site, record.args(), &error);
        }
    }

    fn flush(&self) {
        if let Err(error) = self.lock().sink.flush() {
            // no record to report, and no caller to return the error to
            let _ = writeln!(io::stderr(), "Error flushing logger: {}", error);
        }
    }
}

#[cfg(test)]
mod test {
    use super::Logger;
    use crate::{CallSite, InitError, Level};
    use std::{
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Shared {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn plain(console: &Shared) -> Logger {
        Logger::with_console(console.clone())
            .timestamp_format(None::<&str>)
            .unwrap()
    }

    #[test]
    fn test_explicit_call_site() {
        let console = Shared::default();
        let logger = plain(&console);

        logger
            .emit_at(Level::Error, Some(CallSite::new("src/a/b.rs", 12)), format_args!("hi"))
            .unwrap();
        logger.emit_at(Level::Fatal, None, format_args!("bye")).unwrap();

        assert_eq!(console.contents(), "[ERROR][b.rs:12] hi\n[FATAL] bye\n");
    }

    #[test]
    fn test_trailing_newline_is_not_doubled() {
        let console = Shared::default();
        let logger = plain(&console);

        logger.emit_at(Level::Error, None, format_args!("line\n")).unwrap();

        assert_eq!(console.contents(), "[ERROR] line\n");
    }

    #[test]
    fn test_timestamp_decoration() {
        let console = Shared::default();
        let logger = Logger::with_console(console.clone());

        logger.emit_at(Level::Error, None, format_args!("stamped")).unwrap();

        let line = console.contents();
        assert!(line.starts_with("[ERROR] "), "found {:?}", line);
        // "YYYY/MM/DD HH:MM:SS " is 20 bytes, right after the 8-byte prefix
        assert_eq!(&line[28..], "stamped\n");
        assert_eq!(&line[12..13], "/");
        assert_eq!(&line[21..22], ":");
        assert_eq!(&line[27..28], " ");
    }

    #[test]
    fn test_timestamp_follows_call_site() {
        let console = Shared::default();
        let logger = Logger::with_console(console.clone());

        logger
            .emit_at(Level::Error, Some(CallSite::new("src/a/b.rs", 12)), format_args!("boom now"))
            .unwrap();

        let line = console.contents();
        assert!(line.starts_with("[ERROR][b.rs:12] "), "found {:?}", line);
        assert!(line.ends_with(" boom now\n"), "found {:?}", line);
        assert_eq!(line.len(), "[ERROR][b.rs:12] ".len() + 20 + "boom now\n".len());
    }

    #[test]
    fn test_invalid_timestamp_format_is_rejected() {
        match Logger::new().timestamp_format(Some("%Y-%")) {
            Err(InitError::TimeFormat(pattern)) => assert_eq!(pattern, "%Y-%"),
            other => panic!("expected time format error, got {:?}", other),
        }
    }

    #[test]
    fn test_close_level_message_is_dropped() {
        let console = Shared::default();
        let logger = plain(&console).level(Level::Close);

        logger.emit_at(Level::Close, None, format_args!("not a severity")).unwrap();
        logger.emit_at(Level::Debug, None, format_args!("shown")).unwrap();

        assert_eq!(console.contents(), "[DEBUG] shown\n");
    }

    #[test]
    fn test_failing_display_writes_nothing() {
        struct Failing;

        impl std::fmt::Display for Failing {
            fn fmt(&self, _: &mut std::fmt::Formatter) -> std::fmt::Result {
                Err(std::fmt::Error)
            }
        }

        let console = Shared::default();
        let logger = plain(&console);

        assert!(logger
            .emit_at(Level::Error, None, format_args!("{}", Failing))
            .is_err());
        assert_eq!(console.contents(), "");
    }
}
