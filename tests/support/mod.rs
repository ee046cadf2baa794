//! Support module for tests
#![allow(dead_code)]
use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use lvlog::Logger;

/// In-memory writer which can be cloned and inspected after being handed to
/// a logger.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer which fails every write.
pub struct Broken;

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A logger writing undecorated lines (no timestamp) to the returned buffer.
pub fn plain_logger() -> (Logger, SharedBuf) {
    let console = SharedBuf::default();
    let logger = Logger::with_console(console.clone())
        .timestamp_format(None::<&str>)
        .unwrap();
    (logger, console)
}

/// Splits `[LEVEL][file:line] body` into its parts.
pub fn parse_line(line: &str) -> (&str, &str, &str) {
    let rest = line.strip_prefix('[').expect("line starts with a tag");
    let (level, rest) = rest.split_once("][").expect("level tag");
    let (site, body) = rest.split_once("] ").expect("call site tag");
    (level, site, body)
}
