use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_studentmgrd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn studentmgrd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("studentmgrd-router-smoke");
    let marks_path = workspace.join("studentMarks.txt");
    std::fs::write(
        &marks_path,
        "2\n1001,Ann,18,19,17,80\n1002,Ben,10,9,8,50\n",
    )
    .expect("write fixture");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(&mut stdin, &mut reader, "1", "health", json!({}));

    // Record methods before a store is open answer no_store, not a crash.
    let early = request(&mut stdin, &mut reader, "1b", "records.list", json!({}));
    assert_eq!(
        early
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("no_store")
    );

    let opened = request(
        &mut stdin,
        &mut reader,
        "2",
        "store.open",
        json!({ "path": marks_path.to_string_lossy() }),
    );
    assert_eq!(
        opened
            .get("result")
            .and_then(|r| r.get("recordCount"))
            .and_then(|v| v.as_u64()),
        Some(2)
    );
    assert_eq!(
        opened
            .get("result")
            .and_then(|r| r.get("fileMissing"))
            .and_then(|v| v.as_bool()),
        Some(false)
    );

    let _ = request(&mut stdin, &mut reader, "3", "records.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "records.get",
        json!({ "key": "ann" }),
    );
    let _ = request(&mut stdin, &mut reader, "5", "records.highest", json!({}));
    let _ = request(&mut stdin, &mut reader, "6", "records.lowest", json!({}));
    let _ = request(&mut stdin, &mut reader, "7", "records.aggregate", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "records.sort",
        json!({ "ascending": false }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "9",
        "records.add",
        json!({ "code": "1003", "name": "Cal", "c1": 5, "c2": 6, "c3": 7, "exam": 40 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "10",
        "records.update",
        json!({ "key": "1003", "field": "exam", "value": 55 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "11",
        "records.delete",
        json!({ "key": "1003" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "records.delete",
        json!({ "key": "1003", "confirm": true }),
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
