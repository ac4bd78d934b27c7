//! Watchlist background host.
//!
//! Answers list requests for other components and tells them when stored
//! data changes. It wires together three building blocks:
//!
//! - `RequestReader` reads one JSON request per line from stdin on its own
//!   thread and forwards decoded requests over a `crossbeam_channel`.
//! - `dispatcher::handle_request` runs each request against a `ListService`
//!   and produces exactly one response.
//! - Storage subscriptions on every key, fed both by this process's writes and
//!   by a `FileStore` watcher that notices writes made by other processes.
//!
//! Everything the host emits is written to stdout as one JSON object per line:
//! `{"type":"RESPONSE",...}` for answers and `{"type":"STORAGE_UPDATED",...}`
//! for change broadcasts. The host exits when stdin is closed.
#![warn(missing_docs)]
use crate::args::Args;
use crate::dispatcher::handle_request;
use crate::receiver::{Incoming, RequestReader};
use clap::Parser;
use crossbeam_channel::{Receiver, select, unbounded};
use log::{error, info};
use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use watchlist_common::message::{Outgoing, Response};
use watchlist_common::storage::{
    CURRENT_LIST_KEY, SETTINGS_KEY, SYMBOL_LISTS_KEY, StorageChange, Subscription,
};
use watchlist_common::{FileStore, KeyValueStore, ListService, Result, WatchlistError};

mod args;
mod dispatcher;
mod receiver;

fn main() -> Result<(), WatchlistError> {
    init_logger();
    let args = Args::parse();
    let store = FileStore::open(&args.store)?;
    info!("Serving lists from {}", store.path().display());

    let lists_sub = store.subscribe(SYMBOL_LISTS_KEY)?;
    let current_sub = store.subscribe(CURRENT_LIST_KEY)?;
    let settings_sub = store.subscribe(SETTINGS_KEY)?;
    let watcher = store.watch(Duration::from_millis(args.watch_interval_ms));
    let service = ListService::new(store);

    let (req_tx, req_rx) = unbounded::<Incoming>();
    thread::spawn(move || {
        let reader = RequestReader::new(io::stdin().lock());
        if let Err(e) = reader.receive_loop_with_channel(req_tx) {
            error!("Receiver loop failed: {:?}", e);
        }
    });

    let subscriptions = [&lists_sub, &current_sub, &settings_sub];
    let mut stdout = io::stdout();

    loop {
        select! {
            recv(req_rx) -> msg => match msg {
                Ok(incoming) => {
                    let response = match incoming {
                        Ok(request) => handle_request(&service, request),
                        Err(reason) => Response::failure(reason),
                    };
                    emit(&mut stdout, &Outgoing::Response(response))?;
                }
                Err(_) => break,
            },
            recv(lists_sub.receiver()) -> msg => broadcast(&mut stdout, msg.ok(), &subscriptions)?,
            recv(current_sub.receiver()) -> msg => broadcast(&mut stdout, msg.ok(), &subscriptions)?,
            recv(settings_sub.receiver()) -> msg => broadcast(&mut stdout, msg.ok(), &subscriptions)?,
        }
    }

    watcher.stop();
    info!("Input closed. Shutting down...");
    Ok(())
}

/// Send one `STORAGE_UPDATED` event holding `first` and any other change
/// already waiting on the subscriptions.
fn broadcast<W: Write>(
    out: &mut W,
    first: Option<StorageChange>,
    subscriptions: &[&Subscription],
) -> Result<()> {
    let Some(first) = first else {
        return Ok(());
    };
    let mut changes = vec![first];
    for sub in subscriptions {
        changes.extend(drain(sub.receiver()));
    }
    emit(out, &Outgoing::storage_updated(changes))
}

fn drain(rx: &Receiver<StorageChange>) -> Vec<StorageChange> {
    rx.try_iter().collect()
}

/// Write `message` as one JSON line and flush.
fn emit<W: Write>(out: &mut W, message: &Outgoing) -> Result<()> {
    let line = serde_json::to_string(message)?;
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use watchlist_common::MemoryStore;

    fn lines(buf: &[u8]) -> Vec<Value> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn responses_are_tagged_lines() {
        let mut out = Vec::new();
        emit(&mut out, &Outgoing::Response(Response::failure("List not found"))).unwrap();
        assert_eq!(
            lines(&out),
            vec![json!({"type": "RESPONSE", "success": false, "error": "List not found"})]
        );
    }

    #[test]
    fn one_write_becomes_one_event() {
        let store = MemoryStore::new();
        let lists_sub = store.subscribe(SYMBOL_LISTS_KEY).unwrap();
        let current_sub = store.subscribe(CURRENT_LIST_KEY).unwrap();
        let service = ListService::new(store.clone());
        let list = service.create_list("Swing", vec![]).unwrap();
        service.set_current_list_id(Some(list.id())).unwrap();
        drain(lists_sub.receiver());
        drain(current_sub.receiver());

        // Deleting the current list touches both keys in one batch.
        service.delete_list(list.id()).unwrap();
        let first = lists_sub.receiver().try_recv().ok();
        let mut out = Vec::new();
        broadcast(&mut out, first, &[&lists_sub, &current_sub]).unwrap();

        let events = lines(&out);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "STORAGE_UPDATED");
        let changes = events[0]["changes"].as_object().unwrap();
        assert_eq!(changes["symbolLists"]["newValue"], json!([]));
        assert_eq!(changes["currentListId"]["oldValue"], json!(list.id()));
        assert!(changes["currentListId"].get("newValue").is_none());
    }

    #[test]
    fn closed_subscription_emits_nothing() {
        let mut out = Vec::new();
        broadcast(&mut out, None, &[]).unwrap();
        assert!(out.is_empty());
    }
}
