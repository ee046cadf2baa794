//! Caller-aware line prefixes: `[LEVEL][file.rs:42] `.
use std::{fmt::Write, panic::Location};

use crate::Level;

/// Source location a log call was made from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallSite<'a> {
    file: &'a str,
    line: u32,
}

impl<'a> CallSite<'a> {
    /// A call site at `line` of `file`.
    pub fn new(file: &'a str, line: u32) -> Self {
        CallSite { file, line }
    }

    /// The full path as recorded by the compiler.
    pub fn file(&self) -> &'a str {
        self.file
    }

    /// The 1-based line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The file name without its directories.
    ///
    /// Both `/` and `\` are treated as separators, since `file!()` paths use
    /// the separator of the host that compiled the caller.
    pub fn basename(&self) -> &'a str {
        self.file.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(self.file)
    }
}

impl CallSite<'static> {
    /// Location of the nearest caller not marked `#[track_caller]`.
    ///
    /// Every entry point between user code and this call must carry
    /// `#[track_caller]`; an unmarked wrapper in between makes the wrapper
    /// the reported call site.
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        let location = Location::caller();
        CallSite::new(location.file(), location.line())
    }
}

/// Formats the prefix for a message at `level`.
///
/// Produces `"[LEVEL][basename:line] "`, or `"[LEVEL] "` without a call site.
pub fn format_prefix(level: Level, site: Option<CallSite>) -> String {
    let mut prefix = String::new();
    write_prefix(&mut prefix, level, site);
    prefix
}

pub(crate) fn write_prefix(buf: &mut String, level: Level, site: Option<CallSite>) {
    // writing into a String can't fail
    let _ = match site {
        Some(site) => write!(buf, "[{}][{}:{}] ", level, site.basename(), site.line()),
        None => write!(buf, "[{}] ", level),
    };
}
