//! Symbol lists and the operations that persist them.
//!
//! [`ListService`] owns no state of its own: every call reads the current
//! document from the injected store, changes it and writes it back in a
//! single batch. A failing call leaves the stored data as it was. Failures are
//! tagged with the [`StorageOperation`] that was running, except
//! `ListNotFound` and the input checks which are returned as-is.

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{StorageOperation, WatchlistError};
use crate::result::Result;
use crate::settings::{AppSettings, SettingsUpdate};
use crate::storage::{
    CURRENT_LIST_KEY, KeyValueStore, KeyValueStoreExt, SETTINGS_KEY, SYMBOL_LISTS_KEY,
};
use crate::symbol::{StockSymbol, remove_duplicate_symbols};

/// Named, ordered collection of symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolList {
    id: String,
    name: String,
    symbols: Vec<StockSymbol>,
    #[serde(deserialize_with = "revive_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(deserialize_with = "revive_timestamp")]
    updated_at: DateTime<Utc>,
}

impl SymbolList {
    fn new(name: String, symbols: Vec<StockSymbol>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name,
            symbols,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identifier assigned at creation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// User-provided name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Symbols in list order.
    pub fn symbols(&self) -> &[StockSymbol] {
        &self.symbols
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// `true` if a symbol with this `EXCHANGE:SYMBOL` key is in the list.
    pub fn contains(&self, full_symbol: &str) -> bool {
        self.symbols.iter().any(|s| s.full_symbol() == full_symbol)
    }

    fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }
}

/// Fields `update_list` may change; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUpdate {
    /// New name.
    pub name: Option<String>,
    /// Replacement symbol sequence.
    pub symbols: Option<Vec<StockSymbol>>,
}

/// Everything `export_data` writes and `import_data` reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageData {
    /// All lists.
    pub symbol_lists: Vec<SymbolList>,
    /// Selected list, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_list_id: Option<String>,
    /// Settings with defaults applied.
    pub settings: AppSettings,
}

/// List operations over an injected [`KeyValueStore`].
pub struct ListService<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ListService<S> {
    /// Wrap `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store, e.g. to subscribe to changes.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All lists in creation order.
    pub fn get_all_lists(&self) -> Result<Vec<SymbolList>> {
        self.read_lists()
            .map_err(|e| e.during(StorageOperation::GetAllLists))
    }

    /// The list with `id`, or `None`.
    pub fn get_list(&self, id: &str) -> Result<Option<SymbolList>> {
        let lists = self
            .read_lists()
            .map_err(|e| e.during(StorageOperation::GetList))?;
        Ok(lists.into_iter().find(|l| l.id == id))
    }

    /// Create a list named `name` (trimmed) holding `symbols`.
    ///
    /// Duplicate symbols are collapsed to their first occurrence.
    pub fn create_list(&self, name: &str, symbols: Vec<StockSymbol>) -> Result<SymbolList> {
        let op = StorageOperation::CreateList;
        let name = validate_name(name)?;
        let symbols = remove_duplicate_symbols(symbols);
        self.check_limit(symbols.len()).map_err(|e| e.during(op))?;

        let mut lists = self.read_lists().map_err(|e| e.during(op))?;
        let list = SymbolList::new(name, symbols);
        lists.push(list.clone());
        self.write_lists(&lists).map_err(|e| e.during(op))?;

        info!(
            "Created list '{}' ({}) with {} symbols",
            list.name,
            list.id,
            list.symbols.len()
        );
        Ok(list)
    }

    /// Apply `update` to the list with `id` and bump its `updated_at`.
    pub fn update_list(&self, id: &str, update: ListUpdate) -> Result<SymbolList> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        if let Some(symbols) = &update.symbols {
            self.check_limit(symbols.len())
                .map_err(|e| e.during(StorageOperation::UpdateList))?;
        }
        self.modify(id, StorageOperation::UpdateList, |list| {
            if let Some(name) = name {
                list.name = name;
            }
            if let Some(symbols) = update.symbols {
                list.symbols = symbols;
            }
            true
        })
    }

    /// Give the list with `id` a new name.
    pub fn rename_list(&self, id: &str, name: &str) -> Result<SymbolList> {
        self.update_list(
            id,
            ListUpdate {
                name: Some(name.to_string()),
                symbols: None,
            },
        )
    }

    /// Delete the list with `id`; returns `false` if there was none.
    ///
    /// Clears the current-list pointer in the same write when it referenced the
    /// deleted list.
    pub fn delete_list(&self, id: &str) -> Result<bool> {
        let op = StorageOperation::DeleteList;
        let mut lists = self.read_lists().map_err(|e| e.during(op))?;
        let before = lists.len();
        lists.retain(|l| l.id != id);
        if lists.len() == before {
            debug!("Delete of unknown list {} ignored", id);
            return Ok(false);
        }

        let current = self
            .store
            .load::<String>(CURRENT_LIST_KEY)
            .map_err(|e| e.during(op))?;
        let mut batch = vec![(
            SYMBOL_LISTS_KEY.to_string(),
            Some(serde_json::to_value(&lists).map_err(|e| WatchlistError::from(e).during(op))?),
        )];
        if current.as_deref() == Some(id) {
            batch.push((CURRENT_LIST_KEY.to_string(), None));
        }
        self.store.write_batch(batch).map_err(|e| e.during(op))?;

        info!("Deleted list {}", id);
        Ok(true)
    }

    /// Append `symbols` that are not in the list yet.
    ///
    /// Fails with `SymbolLimitExceeded` if the result would be larger than
    /// `maxSymbolsPerList`.
    pub fn add_symbols(&self, id: &str, symbols: Vec<StockSymbol>) -> Result<SymbolList> {
        let op = StorageOperation::AddSymbolsToList;
        let limit = self.settings().map_err(|e| e.during(op))?.max_symbols_per_list;
        self.modify_checked(id, op, |list| {
            let before = list.symbols.len();
            let mut merged = std::mem::take(&mut list.symbols);
            merged.extend(symbols);
            list.symbols = remove_duplicate_symbols(merged);
            if list.symbols.len() > limit {
                return Err(WatchlistError::SymbolLimitExceeded {
                    requested: list.symbols.len(),
                    limit,
                });
            }
            debug!("Adding {} new symbol(s) to {}", list.symbols.len() - before, id);
            Ok(list.symbols.len() != before)
        })
    }

    /// Remove the symbol whose key is `full_symbol`.
    ///
    /// Removing a symbol that is not in the list leaves the list untouched.
    pub fn remove_symbol(&self, id: &str, full_symbol: &str) -> Result<SymbolList> {
        self.modify(id, StorageOperation::RemoveSymbolFromList, |list| {
            let before = list.symbols.len();
            list.symbols.retain(|s| s.full_symbol() != full_symbol);
            list.symbols.len() != before
        })
    }

    /// Id of the selected list.
    pub fn get_current_list_id(&self) -> Result<Option<String>> {
        self.store
            .load(CURRENT_LIST_KEY)
            .map_err(|e| e.during(StorageOperation::GetCurrentListId))
    }

    /// Select a list, or clear the selection with `None`.
    pub fn set_current_list_id(&self, id: Option<&str>) -> Result<()> {
        let result = match id {
            Some(id) => self.store.save(CURRENT_LIST_KEY, &id),
            None => self.store.remove(CURRENT_LIST_KEY),
        };
        result.map_err(|e| e.during(StorageOperation::SetCurrentListId))
    }

    /// The selected list; `None` if nothing is selected or it no longer exists.
    pub fn get_current_list(&self) -> Result<Option<SymbolList>> {
        let op = StorageOperation::GetCurrentList;
        let Some(id) = self.store.load::<String>(CURRENT_LIST_KEY).map_err(|e| e.during(op))? else {
            return Ok(None);
        };
        let lists = self.read_lists().map_err(|e| e.during(op))?;
        Ok(lists.into_iter().find(|l| l.id == id))
    }

    /// Stored settings, defaults filled in.
    pub fn get_settings(&self) -> Result<AppSettings> {
        self.settings()
            .map_err(|e| e.during(StorageOperation::GetSettings))
    }

    /// Merge `update` into the stored settings.
    pub fn update_settings(&self, update: SettingsUpdate) -> Result<AppSettings> {
        let op = StorageOperation::UpdateSettings;
        let settings = self.settings().map_err(|e| e.during(op))?.merged(&update);
        self.store
            .save(SETTINGS_KEY, &settings)
            .map_err(|e| e.during(op))?;
        Ok(settings)
    }

    /// Remove everything from the store.
    pub fn clear_all(&self) -> Result<()> {
        warn!("Clearing all stored lists and settings");
        self.store
            .clear()
            .map_err(|e| e.during(StorageOperation::ClearAll))
    }

    /// Pretty-printed JSON of all lists, the selection and the settings.
    pub fn export_data(&self) -> Result<String> {
        let op = StorageOperation::ExportData;
        let data = StorageData {
            symbol_lists: self.read_lists().map_err(|e| e.during(op))?,
            current_list_id: self.store.load(CURRENT_LIST_KEY).map_err(|e| e.during(op))?,
            settings: self.settings().map_err(|e| e.during(op))?,
        };
        serde_json::to_string_pretty(&data).map_err(|e| WatchlistError::from(e).during(op))
    }

    /// Replace the stored data with an export produced by [`Self::export_data`].
    ///
    /// Lists that are malformed or lack an id or name are skipped; missing
    /// settings are replaced by the defaults.
    pub fn import_data(&self, json: &str) -> Result<()> {
        let op = StorageOperation::ImportData;
        let data = parse_import(json).map_err(|e| e.during(op))?;
        let batch = vec![
            (
                SYMBOL_LISTS_KEY.to_string(),
                Some(serde_json::to_value(&data.symbol_lists).map_err(|e| WatchlistError::from(e).during(op))?),
            ),
            (
                CURRENT_LIST_KEY.to_string(),
                data.current_list_id.map(Value::String),
            ),
            (
                SETTINGS_KEY.to_string(),
                Some(serde_json::to_value(&data.settings).map_err(|e| WatchlistError::from(e).during(op))?),
            ),
        ];
        self.store.write_batch(batch).map_err(|e| e.during(op))?;
        info!("Imported {} list(s)", data.symbol_lists.len());
        Ok(())
    }

    fn read_lists(&self) -> Result<Vec<SymbolList>> {
        Ok(self.store.load(SYMBOL_LISTS_KEY)?.unwrap_or_default())
    }

    fn write_lists(&self, lists: &[SymbolList]) -> Result<()> {
        self.store.save(SYMBOL_LISTS_KEY, &lists)
    }

    fn settings(&self) -> Result<AppSettings> {
        Ok(self.store.load(SETTINGS_KEY)?.unwrap_or_default())
    }

    fn check_limit(&self, requested: usize) -> Result<()> {
        let limit = self.settings()?.max_symbols_per_list;
        if requested > limit {
            return Err(WatchlistError::SymbolLimitExceeded { requested, limit });
        }
        Ok(())
    }

    fn modify(
        &self,
        id: &str,
        op: StorageOperation,
        change: impl FnOnce(&mut SymbolList) -> bool,
    ) -> Result<SymbolList> {
        self.modify_checked(id, op, |list| Ok(change(list)))
    }

    /// Read-modify-write of one list. `change` reports whether it changed
    /// anything; unchanged lists are not written back.
    fn modify_checked(
        &self,
        id: &str,
        op: StorageOperation,
        change: impl FnOnce(&mut SymbolList) -> Result<bool>,
    ) -> Result<SymbolList> {
        let mut lists = self.read_lists().map_err(|e| e.during(op))?;
        let list = lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| WatchlistError::ListNotFound(id.to_string()))?;

        if !change(list)? {
            debug!("{} left list {} unchanged", op, id);
            return Ok(list.clone());
        }
        list.touch();
        let updated = list.clone();
        self.write_lists(&lists).map_err(|e| e.during(op))?;
        Ok(updated)
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(WatchlistError::InvalidInput(
            "List name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn parse_import(json: &str) -> Result<StorageData> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| WatchlistError::Format(format!("Invalid data format: {}", e)))?;
    let Value::Object(mut root) = value else {
        return Err(WatchlistError::Format("Invalid data format".to_string()));
    };

    let raw_lists = match root.remove(SYMBOL_LISTS_KEY) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let total = raw_lists.len();
    let symbol_lists: Vec<SymbolList> = raw_lists
        .into_iter()
        .filter_map(|item| serde_json::from_value::<SymbolList>(item).ok())
        .filter(|l| !l.id.is_empty() && !l.name.is_empty())
        .collect();
    if symbol_lists.len() < total {
        warn!("Skipped {} invalid list(s) during import", total - symbol_lists.len());
    }

    let current_list_id = match root.remove(CURRENT_LIST_KEY) {
        Some(Value::String(id)) => Some(id),
        _ => None,
    };
    let settings = match root.remove(SETTINGS_KEY) {
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|e| WatchlistError::Format(format!("Invalid settings: {}", e)))?,
        _ => AppSettings::default(),
    };

    Ok(StorageData {
        symbol_lists,
        current_list_id,
        settings,
    })
}

/// Timestamp after `previous`: now, or one millisecond later when the clock
/// has not moved on.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::milliseconds(1)
    }
}

/// Base-36 millisecond clock followed by a random base-36 suffix.
fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let suffix: u64 = rand::rng().random();
    format!("{}{}", to_base36(millis), to_base36(suffix))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Stored timestamps are RFC 3339 strings; older data may hold epoch millis.
fn revive_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(DateTime<Utc>),
        Millis(i64),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(at) => Ok(at),
        RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms).ok_or_else(|| {
            serde::de::Error::custom(format!("timestamp out of range: {}", ms))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::symbol::Exchange;
    use serde_json::json;

    fn nse(code: &str) -> StockSymbol {
        StockSymbol::new(Exchange::NSE, code, None)
    }

    fn service() -> ListService<MemoryStore> {
        ListService::new(MemoryStore::new())
    }

    #[test]
    fn base36_ids_are_unique() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn timestamps_always_move_forward() {
        let future = Utc::now() + TimeDelta::days(1);
        assert_eq!(next_timestamp(future), future + TimeDelta::milliseconds(1));
        let past = Utc::now() - TimeDelta::days(1);
        assert!(next_timestamp(past) > past);
    }

    #[test]
    fn revives_millis_and_strings() {
        let list: SymbolList = serde_json::from_value(json!({
            "id": "a",
            "name": "A",
            "symbols": [],
            "createdAt": 1_700_000_000_000i64,
            "updatedAt": "2024-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(list.created_at().timestamp_millis(), 1_700_000_000_000);
        assert_eq!(list.updated_at().to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn create_trims_name_and_dedups() {
        let svc = service();
        let list = svc
            .create_list("  Momentum  ", vec![nse("TCS"), nse("INFY"), nse("TCS")])
            .unwrap();
        assert_eq!(list.name(), "Momentum");
        assert_eq!(list.symbols().len(), 2);
        assert_eq!(list.created_at(), list.updated_at());
        assert_eq!(svc.get_list(list.id()).unwrap(), Some(list));
    }

    #[test]
    fn blank_name_is_rejected_before_storage() {
        let svc = service();
        svc.store().set_available(false);
        assert!(matches!(
            svc.create_list("   ", vec![]),
            Err(WatchlistError::InvalidInput(_))
        ));
    }

    #[test]
    fn update_and_rename() {
        let svc = service();
        let list = svc.create_list("A", vec![nse("TCS")]).unwrap();
        let renamed = svc.rename_list(list.id(), "B").unwrap();
        assert_eq!(renamed.name(), "B");
        assert!(renamed.updated_at() > list.updated_at());

        let replaced = svc
            .update_list(
                list.id(),
                ListUpdate {
                    name: None,
                    symbols: Some(vec![nse("SBIN")]),
                },
            )
            .unwrap();
        assert_eq!(replaced.name(), "B");
        assert!(replaced.contains("NSE:SBIN"));
        assert!(!replaced.contains("NSE:TCS"));
        assert_eq!(replaced.created_at(), list.created_at());
        assert_eq!(replaced.id(), list.id());
    }

    #[test]
    fn missing_list_is_not_a_storage_error() {
        let svc = service();
        assert!(matches!(
            svc.rename_list("nope", "x"),
            Err(WatchlistError::ListNotFound(id)) if id == "nope"
        ));
        assert!(matches!(
            svc.add_symbols("nope", vec![nse("TCS")]),
            Err(WatchlistError::ListNotFound(_))
        ));
        assert!(!svc.delete_list("nope").unwrap());
        assert_eq!(svc.get_list("nope").unwrap(), None);
    }

    #[test]
    fn add_symbols_merges_without_duplicates() {
        let svc = service();
        let list = svc.create_list("A", vec![nse("TCS")]).unwrap();
        let updated = svc
            .add_symbols(list.id(), vec![nse("INFY"), nse("TCS"), nse("INFY")])
            .unwrap();
        let keys: Vec<String> = updated.symbols().iter().map(|s| s.full_symbol()).collect();
        assert_eq!(keys, vec!["NSE:TCS", "NSE:INFY"]);
    }

    #[test]
    fn symbol_limit_is_enforced_without_writing() {
        let svc = service();
        svc.update_settings(SettingsUpdate {
            max_symbols_per_list: Some(2),
            ..Default::default()
        })
        .unwrap();
        let list = svc.create_list("A", vec![nse("TCS")]).unwrap();

        let err = svc
            .add_symbols(list.id(), vec![nse("INFY"), nse("SBIN")])
            .unwrap_err();
        assert!(matches!(
            err,
            WatchlistError::SymbolLimitExceeded {
                requested: 3,
                limit: 2
            }
        ));
        assert_eq!(svc.get_list(list.id()).unwrap(), Some(list));

        assert!(svc.create_list("B", vec![nse("A1"), nse("B1"), nse("C1")]).is_err());
        assert_eq!(svc.get_all_lists().unwrap().len(), 1);
    }

    #[test]
    fn delete_clears_current_pointer() {
        let svc = service();
        let keep = svc.create_list("Keep", vec![]).unwrap();
        let doomed = svc.create_list("Doomed", vec![]).unwrap();

        svc.set_current_list_id(Some(doomed.id())).unwrap();
        assert_eq!(svc.get_current_list().unwrap(), Some(doomed.clone()));

        assert!(svc.delete_list(doomed.id()).unwrap());
        assert_eq!(svc.get_current_list_id().unwrap(), None);
        assert_eq!(svc.get_all_lists().unwrap(), vec![keep.clone()]);

        svc.set_current_list_id(Some(keep.id())).unwrap();
        let other = svc.create_list("Other", vec![]).unwrap();
        svc.delete_list(other.id()).unwrap();
        assert_eq!(svc.get_current_list_id().unwrap().as_deref(), Some(keep.id()));
    }

    #[test]
    fn storage_failures_are_tagged_and_change_nothing() {
        let svc = service();
        let list = svc.create_list("A", vec![nse("TCS")]).unwrap();
        svc.store().set_available(false);

        let err = svc.add_symbols(list.id(), vec![nse("INFY")]).unwrap_err();
        assert!(matches!(
            err,
            WatchlistError::Storage {
                operation: StorageOperation::AddSymbolsToList,
                ..
            }
        ));
        assert!(matches!(
            svc.delete_list(list.id()),
            Err(WatchlistError::Storage {
                operation: StorageOperation::DeleteList,
                ..
            })
        ));
        assert!(matches!(
            svc.get_all_lists(),
            Err(WatchlistError::Storage {
                operation: StorageOperation::GetAllLists,
                ..
            })
        ));

        svc.store().set_available(true);
        assert_eq!(svc.get_all_lists().unwrap(), vec![list]);
    }

    #[test]
    fn settings_default_then_update() {
        let svc = service();
        assert_eq!(svc.get_settings().unwrap(), AppSettings::default());
        let updated = svc
            .update_settings(SettingsUpdate {
                default_exchange: Some(Exchange::BSE),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.default_exchange, Exchange::BSE);
        assert_eq!(svc.get_settings().unwrap(), updated);
    }

    #[test]
    fn export_then_import_into_fresh_store() {
        let svc = service();
        let list = svc.create_list("A", vec![nse("TCS")]).unwrap();
        svc.set_current_list_id(Some(list.id())).unwrap();
        let exported = svc.export_data().unwrap();

        let fresh = service();
        fresh.import_data(&exported).unwrap();
        assert_eq!(fresh.get_all_lists().unwrap(), vec![list.clone()]);
        assert_eq!(fresh.get_current_list().unwrap(), Some(list));
    }

    #[test]
    fn import_skips_invalid_lists() {
        let svc = service();
        svc.import_data(
            &json!({
                "symbolLists": [
                    {"id": "", "name": "no id", "symbols": [], "createdAt": 0, "updatedAt": 0},
                    {"id": "x", "name": "bad symbols", "symbols": "nope", "createdAt": 0, "updatedAt": 0},
                    {"id": "ok", "name": "Fine", "symbols": [], "createdAt": 0, "updatedAt": 0}
                ]
            })
            .to_string(),
        )
        .unwrap();
        let lists = svc.get_all_lists().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id(), "ok");
        assert_eq!(svc.get_settings().unwrap(), AppSettings::default());
        assert_eq!(svc.get_current_list_id().unwrap(), None);
    }

    #[test]
    fn import_rejects_non_objects() {
        let svc = service();
        assert!(matches!(
            svc.import_data("[1, 2]"),
            Err(WatchlistError::Format(msg)) if msg == "Invalid data format"
        ));
        assert!(matches!(
            svc.import_data("{not json"),
            Err(WatchlistError::Format(_))
        ));
        let bad_settings = r#"{"symbolLists": [], "settings": {"theme": "sepia"}}"#;
        assert!(matches!(
            svc.import_data(bad_settings),
            Err(WatchlistError::Format(msg)) if msg.starts_with("Invalid settings")
        ));
        assert!(svc.store().snapshot().unwrap().is_empty());
    }
}
