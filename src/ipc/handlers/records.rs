use crate::ipc::error::{err, ok, store_err};
use crate::ipc::handlers::open_store;
use crate::ipc::types::{AppState, Request};
use crate::store::{ConfirmDelete, DeleteOutcome, StudentRecord};
use serde_json::json;

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let mut result = json!({
        "records": store.records(),
        "count": store.records().len(),
        "fileMissing": store.file_missing(),
    });
    // The View-All summary line. Average only exists for a non-empty store.
    if let Some(agg) = store.aggregate() {
        result["averagePercentage"] = json!(agg.average_percentage);
    }
    ok(&req.id, result)
}

fn handle_records_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let code = match req.params.get("code").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing code", None),
    };
    if code.is_empty() {
        return err(&req.id, "bad_params", "code must not be empty", None);
    }
    let name = match req.params.get("name").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing name", None),
    };

    let mut marks = [0i64; 3];
    for (i, field) in ["c1", "c2", "c3"].iter().enumerate() {
        marks[i] = match param_i64(&req.params, field) {
            Some(v) => v,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("{} must be an integer", field),
                    None,
                )
            }
        };
    }
    let exam = match param_i64(&req.params, "exam") {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "exam must be an integer", None),
    };

    match store.insert(code, name, marks, exam) {
        Ok(rec) => ok(&req.id, json!({ "record": rec })),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_records_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let Some(key) = req.params.get("key").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.key", None);
    };
    let Some(field) = req.params.get("field").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.field", None);
    };
    let Some(value) = req.params.get("value") else {
        return err(&req.id, "bad_params", "missing params.value", None);
    };

    match store.update(key, field, value) {
        Ok(rec) => ok(&req.id, json!({ "record": rec })),
        Err(e) => store_err(&req.id, e),
    }
}

/// Carries the front-end's answer to the pre-delete question into the
/// store's confirmation seam.
struct WireConfirm {
    answer: bool,
}

impl ConfirmDelete for WireConfirm {
    fn confirm_delete(&mut self, _record: &StudentRecord) -> bool {
        self.answer
    }
}

/// Two-phase delete. Without `params.confirm` the matched record comes back
/// with `requiresConfirmation: true` and nothing changes; the front-end asks
/// its question and resends with `confirm: true` (or `false` to cancel).
fn handle_records_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match open_store(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(key) = req.params.get("key").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.key", None);
    };

    let answer = req.params.get("confirm").and_then(|v| v.as_bool());
    let Some(answer) = answer else {
        return match store.find_by_key(key) {
            Some(rec) => ok(
                &req.id,
                json!({
                    "deleted": false,
                    "requiresConfirmation": true,
                    "record": rec,
                }),
            ),
            None => err(
                &req.id,
                "not_found",
                format!("no record matches {}", key),
                None,
            ),
        };
    };

    match store.delete(key, &mut WireConfirm { answer }) {
        Ok(DeleteOutcome::Deleted(rec)) => {
            ok(&req.id, json!({ "deleted": true, "record": rec }))
        }
        Ok(DeleteOutcome::Cancelled(rec)) => ok(
            &req.id,
            json!({ "deleted": false, "cancelled": true, "record": rec }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

/// Accept a JSON integer or a numeric string; the front-end's prompt
/// returns text.
fn param_i64(params: &serde_json::Value, key: &str) -> Option<i64> {
    let v = params.get(key)?;
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str().and_then(|s| s.trim().parse::<i64>().ok())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.list" => Some(handle_records_list(state, req)),
        "records.add" => Some(handle_records_add(state, req)),
        "records.update" => Some(handle_records_update(state, req)),
        "records.delete" => Some(handle_records_delete(state, req)),
        _ => None,
    }
}
