use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::RecordStore;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "storePath": state.store.as_ref().map(|s| s.path().to_string_lossy().to_string())
        }),
    )
}

fn handle_store_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match RecordStore::open(path) {
        Ok(store) => {
            // A missing file is not an open failure: the store starts empty
            // and the front-end shows its "file missing" notice.
            let resp = json!({
                "storePath": store.path().to_string_lossy(),
                "recordCount": store.records().len(),
                "fileMissing": store.file_missing(),
            });
            state.store = Some(store);
            ok(&req.id, resp)
        }
        Err(e) => err(&req.id, "store_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "store.open" => Some(handle_store_open(state, req)),
        _ => None,
    }
}
