// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Recorded recognition input.
//!
//! A recording is a JSON-lines file with one [`JointFrame`] per line:
//!
//! ```text
//! {"handedness":"right","right":{"points":[[0.01,0.02,0.4], ...],"pose_levels":[0.9, ...]}}
//! {"handedness":"no_hand"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{GestureError, Result};
use crate::hand::JointFrame;

/// Where recorded frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    /// JSON-lines file.
    File(PathBuf),
    /// JSON lines on standard input.
    Stdin,
}

impl FrameSource {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(p) => Some(p),
            Self::Stdin => None,
        }
    }
}

impl From<&str> for FrameSource {
    fn from(s: &str) -> Self {
        if s == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(s))
        }
    }
}

impl From<PathBuf> for FrameSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl std::fmt::Display for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// Iterator over the frames of a recording.
///
/// Yields `Err` for unreadable or malformed lines; the line number is part of
/// the error message and iteration may continue past it.
pub struct FrameReader {
    lines: Box<dyn BufRead + Send>,
    line_no: usize,
    buf: String,
}

impl FrameReader {
    /// Open a recording.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be opened.
    pub fn open(source: &FrameSource) -> Result<Self> {
        let reader: Box<dyn BufRead + Send> = match source {
            FrameSource::File(path) => {
                let file = File::open(path)
                    .map_err(|e| GestureError::IoError(format!("Failed to open {}: {e}", path.display())))?;
                Box::new(BufReader::new(file))
            }
            FrameSource::Stdin => Box::new(BufReader::new(io::stdin())),
        };
        Ok(Self::from_reader(reader))
    }

    /// Read frames from any buffered reader.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            lines: Box::new(reader),
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub const fn line_no(&self) -> usize {
        self.line_no
    }
}

impl Iterator for FrameReader {
    type Item = Result<JointFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.lines.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some(
                serde_json::from_str(line)
                    .map_err(|e| GestureError::InputError(format!("line {}: {e}", self.line_no))),
            );
        }
    }
}

impl std::fmt::Debug for FrameReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader").field("line_no", &self.line_no).finish()
    }
}
