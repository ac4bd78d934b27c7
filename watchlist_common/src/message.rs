//! Messages exchanged with the background host.
//!
//! Requests and events are JSON objects tagged by `type`, one per line. A
//! request is always answered by exactly one `RESPONSE`; `STORAGE_UPDATED`
//! events may be interleaved whenever stored data changes.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lists::{ListUpdate, SymbolList};
use crate::storage::StorageChange;
use crate::symbol::StockSymbol;

/// Requests understood by the background host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    /// Every stored list.
    GetAllLists,
    /// One list by id.
    GetList {
        /// Target list.
        list_id: String,
    },
    /// The selected list, if any.
    GetCurrentList,
    /// Create a list.
    CreateList {
        /// Name of the new list.
        name: String,
        /// Initial symbols.
        #[serde(default)]
        symbols: Vec<StockSymbol>,
    },
    /// Change name and/or symbols of a list.
    UpdateList {
        /// Target list.
        list_id: String,
        /// Fields to change.
        updates: ListUpdate,
    },
    /// Delete a list.
    DeleteList {
        /// Target list.
        list_id: String,
    },
    /// Select a list, or clear the selection with `null`.
    SetCurrentList {
        /// List to select.
        list_id: Option<String>,
    },
}

/// Answer to a [`Request`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Whether the request succeeded.
    pub success: bool,
    /// Single list payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<SymbolList>,
    /// Multi list payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<SymbolList>>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Successful response without payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Successful response carrying one (possibly absent) list.
    pub fn with_list(list: Option<SymbolList>) -> Self {
        Self {
            success: true,
            list,
            ..Default::default()
        }
    }

    /// Successful response carrying several lists.
    pub fn with_lists(lists: Vec<SymbolList>) -> Self {
        Self {
            success: true,
            lists: Some(lists),
            ..Default::default()
        }
    }

    /// Failed response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Old and new value of one key inside a `STORAGE_UPDATED` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    /// Value before the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Value after the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Everything the background host writes to its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outgoing {
    /// Answer to the request read just before.
    Response(Response),
    /// Stored data changed.
    StorageUpdated {
        /// Changed keys.
        changes: BTreeMap<String, ValueChange>,
    },
}

impl Outgoing {
    /// Group storage changes into one `STORAGE_UPDATED` event.
    pub fn storage_updated(changes: impl IntoIterator<Item = StorageChange>) -> Self {
        let changes = changes
            .into_iter()
            .map(|c| {
                (
                    c.key,
                    ValueChange {
                        old_value: c.old_value,
                        new_value: c.new_value,
                    },
                )
            })
            .collect();
        Outgoing::StorageUpdated { changes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_use_extension_field_names() {
        let req: Request = serde_json::from_value(json!({
            "type": "UPDATE_LIST",
            "listId": "abc",
            "updates": {"name": "Swing"}
        }))
        .unwrap();
        assert_eq!(
            req,
            Request::UpdateList {
                list_id: "abc".into(),
                updates: ListUpdate {
                    name: Some("Swing".into()),
                    symbols: None
                }
            }
        );

        let req: Request = serde_json::from_value(json!({"type": "CREATE_LIST", "name": "New"})).unwrap();
        assert!(matches!(req, Request::CreateList { symbols, .. } if symbols.is_empty()));

        assert!(serde_json::from_value::<Request>(json!({"type": "PING"})).is_err());
    }

    #[test]
    fn outgoing_shapes() {
        let response = serde_json::to_value(Outgoing::Response(Response::failure("List not found"))).unwrap();
        assert_eq!(
            response,
            json!({"type": "RESPONSE", "success": false, "error": "List not found"})
        );

        let event = Outgoing::storage_updated([StorageChange {
            key: "currentListId".into(),
            old_value: None,
            new_value: Some(json!("abc")),
        }]);
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            json!({"type": "STORAGE_UPDATED", "changes": {"currentListId": {"newValue": "abc"}}})
        );
    }
}
