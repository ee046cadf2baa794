use std::{
    fmt,
    io::{self, Write},
};

/// Fan-out over the console and, once set up, a log file.
///
/// Callers serialize access; the sink itself holds no lock.
pub(crate) struct Sink {
    console: Box<dyn Write + Send>,
    file: Option<Box<dyn Write + Send>>,
    /// Set once a file has been attached, and never cleared.
    file_attached: bool,
}

impl Sink {
    pub fn new(console: Box<dyn Write + Send>) -> Self {
        Sink {
            console,
            file: None,
            file_attached: false,
        }
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn file_attached(&self) -> bool {
        self.file_attached
    }

    pub fn attach_file(&mut self, file: Box<dyn Write + Send>) {
        self.file = Some(file);
        self.file_attached = true;
    }

    /// Flushes and drops the file writer, leaving the console.
    pub fn detach_file(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Writes one complete line to every writer.
    ///
    /// All writers are attempted; the first failure is returned.
    pub fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        let console = write_flushed(&mut *self.console, line);
        let file = match self.file {
            Some(ref mut file) => write_flushed(&mut **file, line),
            None => Ok(()),
        };
        console.and(file)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        let console = self.console.flush();
        let file = match self.file {
            Some(ref mut file) => file.flush(),
            None => Ok(()),
        };
        console.and(file)
    }
}

fn write_flushed(writer: &mut (dyn Write + Send), line: &[u8]) -> io::Result<()> {
    writer.write_all(line)?;
    writer.flush()
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Sink")
            .field("console", &"<writer>")
            .field("file", &self.file.as_ref().map(|_| "<writer>"))
            .finish()
    }
}
