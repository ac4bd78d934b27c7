//! Watchlist Client: the command-line counterpart of the extension popup and
//! the floating widget. It imports symbols from CSV files or pasted text into
//! named lists, manages those lists and the current selection, prints chart
//! URLs, and can keep a live view of the current list open.
//!
//! Usage example (CLI):
//! ```bash
//! watchlist_client --store ./watchlist.json import ./breakouts.csv
//! watchlist_client paste "NSE:TCS, BSE:500325" --name Swing
//! watchlist_client show --search tata --sort stock-name --desc
//! watchlist_client watch --search bank
//! ```
//!
//! The store path can also be set through `WATCHLIST_STORE`.
#![warn(missing_docs)]
mod args;
mod widget;

use crate::args::{Args, Command};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use watchlist_common::settings::SettingsUpdate;
use watchlist_common::symbol::{filter_symbols, sort_symbols_by};
use watchlist_common::upload::{read_csv_file, suggested_list_name};
use watchlist_common::{
    FileStore, KeyValueStore, ListService, ParseResult, Result, StockSymbol, SymbolList,
    WatchlistError, generate_trading_view_url, parse_text_input,
};

/// Parse errors printed after an import; the rest are only counted.
const SHOWN_ERRORS: usize = 5;

fn main() -> Result<(), WatchlistError> {
    init_logger();
    let args = Args::parse();
    let store = FileStore::open(&args.store)?;

    match args.command {
        Command::Watch {
            interval_ms,
            search,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let shutdown = shutdown.clone();
                ctrlc::set_handler(move || {
                    info!("Ctrl+C received. Shutting down widget...");
                    shutdown.store(true, Ordering::SeqCst);
                })
                .map_err(|e| WatchlistError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
            }
            widget::run(
                store,
                Duration::from_millis(interval_ms),
                search.as_deref(),
                shutdown,
            )
        }
        command => run_command(&ListService::new(store), command),
    }
}

fn run_command<S: KeyValueStore>(service: &ListService<S>, command: Command) -> Result<()> {
    match command {
        Command::Import { path, name, list } => {
            let result = read_csv_file(&path)?;
            let name = name.unwrap_or_else(|| suggested_list_name(&path));
            store_parsed(service, result, &name, list.as_deref())
        }
        Command::Paste { text, name, list } => {
            let result = parse_text_input(&text);
            store_parsed(service, result, name.as_deref().unwrap_or_default(), list.as_deref())
        }
        Command::Lists => {
            let current = service.get_current_list_id()?;
            let lists = service.get_all_lists()?;
            if lists.is_empty() {
                println!("No lists yet.");
            }
            for list in lists {
                let marker = if current.as_deref() == Some(list.id()) { "*" } else { " " };
                println!(
                    "{} {}  {}  ({} symbols)",
                    marker,
                    list.id(),
                    list.name(),
                    list.symbols().len()
                );
            }
            Ok(())
        }
        Command::Show {
            list,
            search,
            sort,
            desc,
        } => {
            let list = match list {
                Some(id) => service.get_list(&id)?.ok_or(WatchlistError::ListNotFound(id))?,
                None => match service.get_current_list()? {
                    Some(list) => list,
                    None => {
                        println!("No list selected.");
                        return Ok(());
                    }
                },
            };
            let search = search.as_deref().unwrap_or_default();
            let mut symbols = filter_symbols(list.symbols(), search);
            if let Some(by) = sort {
                symbols = sort_symbols_by(&symbols, by, desc);
            }
            print_symbols(&list, &symbols);
            Ok(())
        }
        Command::Create { name } => {
            let list = service.create_list(&name, Vec::new())?;
            println!("Created {} ({})", list.name(), list.id());
            Ok(())
        }
        Command::Rename { id, name } => {
            let list = service.rename_list(&id, &name)?;
            println!("Renamed {} to {}", list.id(), list.name());
            Ok(())
        }
        Command::Delete { id } => {
            if service.delete_list(&id)? {
                println!("Deleted {}", id);
            } else {
                warn!("No list with id {}", id);
            }
            Ok(())
        }
        Command::Use { id, none } => {
            let id = if none { None } else { id };
            if let Some(id) = &id {
                service
                    .get_list(id)?
                    .ok_or_else(|| WatchlistError::ListNotFound(id.clone()))?;
            }
            service.set_current_list_id(id.as_deref())?;
            println!("Current list: {}", id.as_deref().unwrap_or("none"));
            Ok(())
        }
        Command::Remove { id, full_symbol } => {
            let key = full_symbol.trim().to_uppercase();
            let list = service.remove_symbol(&id, &key)?;
            println!("{} now holds {} symbols", list.name(), list.symbols().len());
            Ok(())
        }
        Command::Open { full_symbol } => {
            let symbol: StockSymbol = full_symbol
                .parse()
                .map_err(|e| WatchlistError::InvalidInput(format!("{}", e)))?;
            println!("{}", generate_trading_view_url(&symbol));
            Ok(())
        }
        Command::Settings {
            default_exchange,
            theme,
            max_symbols,
        } => {
            let update = SettingsUpdate {
                default_exchange,
                theme,
                max_symbols_per_list: max_symbols,
            };
            let settings = if update == SettingsUpdate::default() {
                service.get_settings()?
            } else {
                service.update_settings(update)?
            };
            println!(
                "defaultExchange={} theme={} maxSymbolsPerList={}",
                settings.default_exchange, settings.theme, settings.max_symbols_per_list
            );
            Ok(())
        }
        Command::Export { output } => {
            let json = service.export_data()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    info!("Exported to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Command::Restore { path } => {
            let json = fs::read_to_string(&path)?;
            service.import_data(&json)?;
            println!("Restored data from {}", path.display());
            Ok(())
        }
        Command::Reset => {
            service.clear_all()?;
            println!("All data removed.");
            Ok(())
        }
        Command::Watch { .. } => Err(WatchlistError::Format(
            "watch runs on a file store".to_string(),
        )),
    }
}

/// Save parse output into a new list named `name`, or into `target` if given,
/// and make that list current.
fn store_parsed<S: KeyValueStore>(
    service: &ListService<S>,
    result: ParseResult,
    name: &str,
    target: Option<&str>,
) -> Result<()> {
    report(&result);
    if !result.has_symbols() {
        return Err(WatchlistError::InvalidInput(
            "no valid symbols found".to_string(),
        ));
    }

    let list = match target {
        Some(id) => service.add_symbols(id, result.symbols)?,
        None => service.create_list(name, result.symbols)?,
    };
    service.set_current_list_id(Some(list.id()))?;
    println!(
        "List {} ({}) now holds {} symbols",
        list.name(),
        list.id(),
        list.symbols().len()
    );
    Ok(())
}

fn report(result: &ParseResult) {
    println!(
        "Parsed {} symbols, {} errors",
        result.success_count, result.error_count
    );
    for error in result.first_errors(SHOWN_ERRORS) {
        println!("  - {}", error);
    }
    if result.errors.len() > SHOWN_ERRORS {
        println!("  ... and {} more", result.errors.len() - SHOWN_ERRORS);
    }
}

fn print_symbols(list: &SymbolList, symbols: &[StockSymbol]) {
    println!("{} ({})", list.name(), list.id());
    for symbol in symbols {
        let name = symbol.stock_name.as_deref().unwrap_or("");
        println!(
            "  {:<20} {:<30} {}",
            symbol.full_symbol(),
            name,
            generate_trading_view_url(symbol)
        );
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
