use crossbeam_channel::Sender;
use log::{debug, info, warn};
use serde_json::Value;
use std::io::BufRead;
use watchlist_common::WatchlistError;
use watchlist_common::message::Request;

/// Message types the host knows how to dispatch.
const KNOWN_TYPES: [&str; 7] = [
    "GET_ALL_LISTS",
    "GET_LIST",
    "GET_CURRENT_LIST",
    "CREATE_LIST",
    "UPDATE_LIST",
    "DELETE_LIST",
    "SET_CURRENT_LIST",
];

/// A decoded request, or the error text to answer it with.
pub type Incoming = Result<Request, String>;

/// Reads one JSON request per line and forwards it into a channel.
///
/// Lines that cannot be decoded are forwarded as `Err` so the host still
/// answers them with a failed response instead of stopping.
pub struct RequestReader<R: BufRead> {
    input: R,
}

impl<R: BufRead> RequestReader<R> {
    /// Wrap a line-oriented input such as locked stdin.
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Blocking loop; returns on end of input or when the channel is closed.
    pub fn receive_loop_with_channel(self, tx: Sender<Incoming>) -> Result<(), WatchlistError> {
        info!("Reading requests from input");
        for line in self.input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let incoming = decode(&line);
            debug!("Received {:?}", incoming);
            tx.send(incoming)
                .map_err(|e| WatchlistError::ChannelSend(e.to_string()))?;
        }
        info!("Input closed");
        Ok(())
    }
}

/// Decode a single request line.
pub fn decode(line: &str) -> Incoming {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!("Malformed request: {}", e);
        format!("Malformed message: {}", e)
    })?;
    let kind = match value.get("type").and_then(Value::as_str) {
        Some(kind) => kind.to_string(),
        None => return Err("Message type is missing".to_string()),
    };
    if !KNOWN_TYPES.contains(&kind.as_str()) {
        return Err(format!("Unknown message type: {}", kind));
    }
    serde_json::from_value(value).map_err(|e| format!("Invalid {} message: {}", kind, e))
}
