//! End-to-end behaviour of parsing into lists and persisting them.

use std::time::Duration;

use watchlist_common::storage::{CURRENT_LIST_KEY, SYMBOL_LISTS_KEY};
use watchlist_common::{
    FileStore, KeyValueStore, ListService, MemoryStore, StockSymbol, WatchlistError,
    generate_trading_view_url, parse_csv, parse_text_input, remove_duplicate_symbols,
};

#[test]
fn pasted_symbols_round_trip_through_a_list() {
    let svc = ListService::new(MemoryStore::new());

    let parsed = parse_text_input("NSE:TCS, bse:500325, NSE:INFY");
    assert_eq!(parsed.error_count, 0);
    let list = svc.create_list("Pasted", Vec::new()).unwrap();
    svc.add_symbols(list.id(), parsed.symbols).unwrap();
    svc.remove_symbol(list.id(), "BSE:500325").unwrap();

    let stored = svc.get_list(list.id()).unwrap().expect("list exists");
    let keys: Vec<String> = stored.symbols().iter().map(StockSymbol::full_symbol).collect();
    assert_eq!(keys, vec!["NSE:TCS", "NSE:INFY"]);
    assert!(stored.updated_at() > stored.created_at());
}

#[test]
fn removing_a_symbol_twice_is_a_no_op() {
    let svc = ListService::new(MemoryStore::new());
    let list = svc
        .create_list("Twice", parse_text_input("NSE:TCS, NSE:INFY").symbols)
        .unwrap();

    let first = svc.remove_symbol(list.id(), "NSE:TCS").unwrap();
    let second = svc.remove_symbol(list.id(), "NSE:TCS").unwrap();
    assert_eq!(first, second);
    assert_eq!(svc.get_list(list.id()).unwrap(), Some(first));
}

#[test]
fn csv_import_dedups_only_when_merging() {
    let parsed = parse_csv("Symbol,Company\nTCS,Tata\nINFY,Infosys\nTCS,Tata again\n");
    assert_eq!(parsed.symbols.len(), 3);

    let unique = remove_duplicate_symbols(parsed.symbols.clone());
    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].stock_name.as_deref(), Some("Tata"));

    let svc = ListService::new(MemoryStore::new());
    let list = svc.create_list("Import", parsed.symbols).unwrap();
    assert_eq!(list.symbols(), unique.as_slice());

    let url = generate_trading_view_url(&list.symbols()[1]);
    assert_eq!(url, "https://in.tradingview.com/chart/?symbol=NSE%3AINFY");
}

#[test]
fn widget_context_is_notified_of_popup_writes() {
    let popup = ListService::new(MemoryStore::new());
    let widget_store = popup.store().clone();
    let lists_sub = widget_store.subscribe(SYMBOL_LISTS_KEY).unwrap();
    let current_sub = widget_store.subscribe(CURRENT_LIST_KEY).unwrap();

    let list = popup.create_list("Shared", Vec::new()).unwrap();
    popup.set_current_list_id(Some(list.id())).unwrap();

    let change = lists_sub
        .receiver()
        .recv_timeout(Duration::from_secs(1))
        .unwrap();
    assert!(change.old_value.is_none());
    assert_eq!(change.new_value.unwrap()[0]["name"], "Shared");

    let change = current_sub
        .receiver()
        .recv_timeout(Duration::from_secs(1))
        .unwrap();
    assert_eq!(change.new_value.unwrap(), list.id());

    // The widget re-reads instead of trusting its copy.
    let widget = ListService::new(widget_store);
    assert_eq!(widget.get_current_list().unwrap(), Some(list.clone()));

    popup.delete_list(list.id()).unwrap();
    let cleared = current_sub
        .receiver()
        .recv_timeout(Duration::from_secs(1))
        .unwrap();
    assert_eq!(cleared.new_value, None);
    assert_eq!(widget.get_current_list().unwrap(), None);
}

#[test]
fn file_backed_lists_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watchlist.json");

    let id = {
        let svc = ListService::new(FileStore::open(&path).unwrap());
        let list = svc
            .create_list("Disk", parse_text_input("NSE:SBIN").symbols)
            .unwrap();
        svc.set_current_list_id(Some(list.id())).unwrap();
        list.id().to_string()
    };

    let svc = ListService::new(FileStore::open(&path).unwrap());
    let current = svc.get_current_list().unwrap().expect("current list");
    assert_eq!(current.id(), id);
    assert_eq!(current.symbols()[0].full_symbol(), "NSE:SBIN");

    assert!(matches!(
        svc.remove_symbol("gone", "NSE:SBIN"),
        Err(WatchlistError::ListNotFound(_))
    ));
}
