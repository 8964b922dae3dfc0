//! Client for mpv's JSON IPC socket (`--input-ipc-server`).

use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use serde_json::{Value, json};
use thiserror::Error;

const REPLY_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("mpv IPC I/O: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse mpv IPC reply: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("mpv IPC connection closed")]
    Closed,

    #[error("mpv IPC error: {0}")]
    Command(String),

    #[error("property {0} has an unexpected type")]
    Type(String),
}

impl IpcError {
    /// Whether the connection is unusable afterwards. A refused command
    /// (e.g. "property unavailable" while a file is still opening) is not.
    pub fn breaks_connection(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Parse(_) | Self::Closed)
    }
}

/// One connection to a running mpv. Requests are answered in order; event
/// lines that arrive in between are skipped.
pub struct MpvClient {
    writer: UnixStream,
    reader: BufReader<UnixStream>,
    next_id: u64,
}

impl MpvClient {
    pub fn connect(path: &Path) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(path)?;
        stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            writer: stream,
            reader,
            next_id: 1,
        })
    }

    pub fn request(&mut self, command: Value) -> Result<Value, IpcError> {
        let id = self.next_id;
        self.next_id += 1;

        let payload = json!({
            "command": command,
            "request_id": id,
        });
        self.writer.write_all(payload.to_string().as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(IpcError::Closed);
            }
            if line.trim().is_empty() {
                continue;
            }
            let reply: Value = serde_json::from_str(&line)?;
            if reply.get("request_id").and_then(Value::as_u64) != Some(id) {
                continue;
            }
            let error = reply
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            if error != "success" {
                return Err(IpcError::Command(error.to_string()));
            }
            return Ok(reply.get("data").cloned().unwrap_or(Value::Null));
        }
    }

    fn send(&mut self, command: Value) -> Result<(), IpcError> {
        self.request(command).map(|_| ())
    }

    pub fn get_f64(&mut self, property: &str) -> Result<f64, IpcError> {
        self.request(json!(["get_property", property]))?
            .as_f64()
            .ok_or_else(|| IpcError::Type(property.to_string()))
    }

    pub fn get_bool(&mut self, property: &str) -> Result<bool, IpcError> {
        self.request(json!(["get_property", property]))?
            .as_bool()
            .ok_or_else(|| IpcError::Type(property.to_string()))
    }

    pub fn set_f64(&mut self, property: &str, value: f64) -> Result<(), IpcError> {
        self.send(json!(["set_property", property, value]))
    }

    pub fn set_pause(&mut self, paused: bool) -> Result<(), IpcError> {
        self.send(json!(["set_property", "pause", paused]))
    }

    pub fn seek_absolute(&mut self, seconds: f64) -> Result<(), IpcError> {
        self.send(json!(["seek", seconds, "absolute"]))
    }

    pub fn quit(&mut self) -> Result<(), IpcError> {
        self.send(json!(["quit"]))
    }
}
