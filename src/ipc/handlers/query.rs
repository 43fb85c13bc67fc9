use crate::ipc::error::{err, ok};
use crate::ipc::handlers::open_store;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_records_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(key) = req.params.get("key").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.key", None);
    };

    match store.find_by_key(key) {
        Some(rec) => ok(&req.id, json!({ "record": rec })),
        None => err(
            &req.id,
            "not_found",
            format!("no record matches {}", key),
            None,
        ),
    }
}

fn handle_records_aggregate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.aggregate() {
        Some(agg) => ok(&req.id, json!(agg)),
        None => err(&req.id, "no_records", "the store is empty", None),
    }
}

/// Highest/Lowest Score buttons: first record in store order holding the
/// extreme percentage.
fn handle_records_extreme(state: &mut AppState, req: &Request, highest: bool) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match store.aggregate() {
        Some(agg) => {
            let rec = if highest { agg.max } else { agg.min };
            ok(&req.id, json!({ "record": rec }))
        }
        None => err(&req.id, "no_records", "the store is empty", None),
    }
}

fn handle_records_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let ascending = req
        .params
        .get("ascending")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    // A sorted view only; the file keeps its insertion order.
    let sorted = store.sorted_by_percentage(ascending);
    ok(
        &req.id,
        json!({ "records": sorted, "ascending": ascending }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.get" => Some(handle_records_get(state, req)),
        "records.aggregate" => Some(handle_records_aggregate(state, req)),
        "records.highest" => Some(handle_records_extreme(state, req, true)),
        "records.lowest" => Some(handle_records_extreme(state, req, false)),
        "records.sort" => Some(handle_records_sort(state, req)),
        _ => None,
    }
}
