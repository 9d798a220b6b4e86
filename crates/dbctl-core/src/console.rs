//! Console sink for user-facing output
//!
//! Operation results go here rather than through `tracing`, so stdout carries
//! only what the user asked for (one JSON payload with `--json`).

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::{CoreError, Result};

/// Line-oriented writer shared by all operations of a client
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// A console writing into an in-memory buffer, plus a handle to read it
    pub fn capture() -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        (Self::new(Box::new(captured.clone())), captured)
    }

    /// Write one line
    pub fn line(&self, text: impl AsRef<str>) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| CoreError::Io(io::Error::other("console lock poisoned")))?;
        writeln!(out, "{}", text.as_ref())?;
        out.flush()?;
        Ok(())
    }

    /// Write a value as a single line of JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string(value).map_err(|e| CoreError::Decode(e.to_string()))?;
        self.line(text)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Shared in-memory buffer behind [`Console::capture`]
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::other("capture lock poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_lines() {
        let (console, captured) = Console::capture();
        console.line("first").unwrap();
        console.line(String::from("second")).unwrap();
        assert_eq!(captured.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_json_is_single_line() {
        let (console, captured) = Console::capture();
        console.json(&json!({"a": [1, 2], "b": {"c": true}})).unwrap();
        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["b"]["c"], true);
    }
}
