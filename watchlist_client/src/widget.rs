//! Terminal mirror of the current list.
//!
//! Keeps a read-through copy of the current list and re-reads it from the
//! store whenever the list collection or the current-list pointer changes,
//! whether the write came from this process or another one.
use crossbeam_channel::select;
use log::{debug, info};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use watchlist_common::storage::{CURRENT_LIST_KEY, SYMBOL_LISTS_KEY};
use watchlist_common::symbol::filter_symbols;
use watchlist_common::{
    FileStore, KeyValueStore, ListService, Result, SymbolList, generate_trading_view_url,
};

/// How often the loop wakes up to check the shutdown flag.
const SHUTDOWN_CHECK_MS: u64 = 200;

/// Runs a blocking loop that prints the current list every time it changes,
/// narrowed to symbols matching `search` when given.
/// Returns when `shutdown` is set.
pub fn run(
    store: FileStore,
    interval: Duration,
    search: Option<&str>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let search = search.unwrap_or_default();
    let lists_sub = store.subscribe(SYMBOL_LISTS_KEY)?;
    let current_sub = store.subscribe(CURRENT_LIST_KEY)?;
    let watcher = store.watch(interval);
    let service = ListService::new(store);

    let mut shown = service.get_current_list()?;
    render(shown.as_ref(), search);

    while !shutdown.load(Ordering::Relaxed) {
        let changed = select! {
            recv(lists_sub.receiver()) -> msg => msg.is_ok(),
            recv(current_sub.receiver()) -> msg => msg.is_ok(),
            default(Duration::from_millis(SHUTDOWN_CHECK_MS)) => false,
        };
        if !changed {
            continue;
        }

        let current = service.get_current_list()?;
        if current != shown {
            debug!("Current list changed, re-rendering");
            render(current.as_ref(), search);
            shown = current;
        }
    }

    watcher.stop();
    info!("Widget loop stopping...");
    Ok(())
}

fn render(list: Option<&SymbolList>, search: &str) {
    let Some(list) = list else {
        println!("-- no list selected --");
        return;
    };
    println!(
        "== {} ({} symbols, updated {}) ==",
        list.name(),
        list.symbols().len(),
        list.updated_at().format("%Y-%m-%d %H:%M:%S")
    );
    let symbols = filter_symbols(list.symbols(), search);
    if symbols.len() < list.symbols().len() {
        println!("  showing {} matching \"{}\"", symbols.len(), search.trim());
    }
    for symbol in &symbols {
        println!("  {:<20} {}", symbol.full_symbol(), generate_trading_view_url(symbol));
    }
}
