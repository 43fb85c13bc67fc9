pub mod core;
pub mod query;
pub mod records;

use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::RecordStore;

/// Every record operation starts from a fresh read of the file, so no
/// session state survives between operations. Returns the error envelope
/// when no store is open or the re-read fails.
pub fn open_store<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut RecordStore, serde_json::Value> {
    let Some(store) = state.store.as_mut() else {
        return Err(err(&req.id, "no_store", "open a marks file first", None));
    };
    if let Err(e) = store.reload() {
        return Err(err(&req.id, "store_open_failed", e.to_string(), None));
    }
    Ok(store)
}
