//! Maps background requests onto [`ListService`] calls.
use log::{debug, error};
use watchlist_common::message::{Request, Response};
use watchlist_common::{KeyValueStore, ListService, WatchlistError};

const LIST_NOT_FOUND: &str = "List not found";

/// Run one request and build its response. Never fails: errors become
/// `success: false` responses.
pub fn handle_request<S: KeyValueStore>(service: &ListService<S>, request: Request) -> Response {
    debug!("Dispatching {:?}", request);
    let result = match request {
        Request::GetAllLists => service.get_all_lists().map(Response::with_lists),
        Request::GetList { list_id } => service.get_list(&list_id).and_then(|list| match list {
            Some(list) => Ok(Response::with_list(Some(list))),
            None => Err(WatchlistError::ListNotFound(list_id)),
        }),
        Request::GetCurrentList => service.get_current_list().map(Response::with_list),
        Request::CreateList { name, symbols } => service
            .create_list(&name, symbols)
            .map(|list| Response::with_list(Some(list))),
        Request::UpdateList { list_id, updates } => service
            .update_list(&list_id, updates)
            .map(|list| Response::with_list(Some(list))),
        // Deleting an unknown id still succeeds; the list is gone either way.
        Request::DeleteList { list_id } => service.delete_list(&list_id).map(|_| Response::ok()),
        Request::SetCurrentList { list_id } => service
            .set_current_list_id(list_id.as_deref())
            .map(|_| Response::ok()),
    };

    result.unwrap_or_else(|e| match e {
        WatchlistError::ListNotFound(id) => {
            debug!("No list {}", id);
            Response::failure(LIST_NOT_FOUND)
        }
        other => {
            error!("Request failed: {}", other);
            Response::failure(other.to_string())
        }
    })
}
