//! End-to-end message rewriting through a populated `DebugBridge`.

use serde_json::{Value, json};
use url::Url;

use celldap::notebook::{NotebookCell, cell_uri};
use celldap::rewrite::{CellResolver, CompiledTextStore};
use celldap::session::DebugBridge;
use celldap::sourcemap::{LineCol, SourceMap};

/// A bridge with one registered cell: ordinal 2 of `sales.ipynb`, whose
/// original line 3 compiles to generated line 30.
fn bridge_with_cell() -> (DebugBridge, Url) {
    let bridge = DebugBridge::new().expect("bridge");
    let notebook = Url::parse("file:///work/sales.ipynb").unwrap();
    let identity = cell_uri(&notebook, "cell-1").unwrap();

    bridge.registry().insert(NotebookCell::new(
        identity.clone(),
        "sales.ipynb",
        Some(2),
        "python",
        "import runner\n\ntotal = runner.sum()\n",
    ));
    bridge.registry().attach_source_map(
        &identity,
        SourceMap::builder()
            .entry(LineCol::new(3, 0), LineCol::new(30, 0))
            .entry(LineCol::new(3, 8), LineCol::new(30, 8))
            .build(),
    );
    (bridge, identity)
}

fn dump_path(bridge: &DebugBridge, identity: &Url) -> String {
    let cell = bridge.registry().by_identity(identity).unwrap();
    bridge
        .registry()
        .physical_path(&cell)
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[test]
fn outbound_set_breakpoints_rewrites_source_and_breakpoints() {
    let (bridge, identity) = bridge_with_cell();

    let mut message = json!({
        "seq": 10, "type": "request", "command": "setBreakpoints",
        "arguments": {
            "source": {"path": identity.to_string(), "name": "sales.ipynb, Cell 3"},
            "breakpoints": [{"line": 3}],
            "sourceModified": false,
        }
    });
    bridge.rewrite_outbound(&mut message);

    let rewritten_path = message
        .pointer("/arguments/source/path")
        .and_then(Value::as_str)
        .unwrap();
    assert_eq!(rewritten_path, dump_path(&bridge, &identity));
    assert_eq!(
        message.pointer("/arguments/breakpoints/0"),
        Some(&json!({"line": 30, "column": 0}))
    );
    // Fields outside the rewrite surface survive verbatim.
    assert_eq!(message["seq"], json!(10));
    assert_eq!(
        message.pointer("/arguments/sourceModified"),
        Some(&json!(false))
    );

    // The dump the adapter is pointed at really contains the compiled text.
    let on_disk = std::fs::read_to_string(rewritten_path).unwrap();
    assert!(on_disk.contains("runner.sum()"));
}

#[test]
fn inbound_stack_trace_restores_cell_coordinates_and_naming() {
    let (bridge, identity) = bridge_with_cell();
    let dump = dump_path(&bridge, &identity);

    let mut message = json!({
        "seq": 21, "type": "response", "request_seq": 20, "command": "stackTrace",
        "success": true,
        "body": {"stackFrames": [{
            "id": 1, "name": "<cell>", "line": 30, "column": 8,
            "source": {"path": dump, "name": "celldap-dump"}
        }], "totalFrames": 1}
    });
    bridge.rewrite_inbound(&mut message);

    assert_eq!(
        message.pointer("/body/stackFrames/0/source/path"),
        Some(&json!(identity.to_string()))
    );
    assert_eq!(
        message.pointer("/body/stackFrames/0/source/name"),
        Some(&json!("sales.ipynb, Cell 3"))
    );
    assert_eq!(
        message.pointer("/body/stackFrames/0/line"),
        Some(&json!(3))
    );
    assert_eq!(
        message.pointer("/body/stackFrames/0/column"),
        Some(&json!(8))
    );
}

#[test]
fn round_trip_breakpoint_then_stack_frame_is_stable() {
    let (bridge, identity) = bridge_with_cell();

    let mut request = json!({
        "type": "request", "command": "setBreakpoints",
        "arguments": {"source": {"path": identity.to_string()},
                      "breakpoints": [{"line": 3}]}
    });
    bridge.rewrite_outbound(&mut request);
    let generated_line = request
        .pointer("/arguments/breakpoints/0/line")
        .and_then(Value::as_u64)
        .unwrap();

    let mut response = json!({
        "type": "response", "command": "stackTrace", "success": true,
        "body": {"stackFrames": [{
            "id": 1, "name": "<cell>", "line": generated_line, "column": 0,
            "source": {"path": dump_path(&bridge, &identity)}
        }]}
    });
    bridge.rewrite_inbound(&mut response);

    assert_eq!(
        response.pointer("/body/stackFrames/0/line"),
        Some(&json!(3))
    );
}

#[test]
fn messages_outside_the_allow_list_are_identity() {
    let (bridge, identity) = bridge_with_cell();

    let mut message = json!({
        "seq": 5, "type": "request", "command": "evaluate",
        "arguments": {"expression": "total", "frameId": 1,
                      "source": {"path": identity.to_string()}}
    });
    let before = message.clone();
    bridge.rewrite_outbound(&mut message);
    assert_eq!(message, before);
}

#[test]
fn unknown_sources_are_preserved_in_both_directions() {
    let (bridge, _) = bridge_with_cell();

    let mut outbound = json!({
        "type": "request", "command": "setBreakpoints",
        "arguments": {"source": {"path": "file:///work/helper.py", "name": "helper.py"},
                      "breakpoints": [{"line": 3}]}
    });
    let before = outbound.clone();
    bridge.rewrite_outbound(&mut outbound);
    assert_eq!(outbound, before);

    let mut inbound = json!({
        "type": "event", "event": "loadedSource",
        "body": {"reason": "new", "source": {"path": "/usr/lib/python/abc.py"}}
    });
    let before = inbound.clone();
    bridge.rewrite_inbound(&mut inbound);
    assert_eq!(inbound, before);
}

#[test]
fn closed_cell_is_not_resurfaced_to_the_editor() {
    let (bridge, identity) = bridge_with_cell();
    let dump = dump_path(&bridge, &identity);

    bridge.registry().close(&identity);

    let mut message = json!({
        "type": "event", "event": "output",
        "body": {"output": "late\n", "source": {"path": dump, "name": "raw"}}
    });
    let before = message.clone();
    bridge.rewrite_inbound(&mut message);
    assert_eq!(message, before, "a dead cell's dump path must pass through");
}

#[test]
fn scopes_response_translates_source_and_location_per_scope() {
    let (bridge, identity) = bridge_with_cell();
    let dump = dump_path(&bridge, &identity);

    let mut message = json!({
        "type": "response", "command": "scopes", "success": true,
        "body": {"scopes": [
            {"name": "Locals", "variablesReference": 3, "expensive": false,
             "line": 30, "column": 0, "source": {"path": dump}},
            {"name": "Globals", "variablesReference": 4, "expensive": true},
        ]}
    });
    bridge.rewrite_inbound(&mut message);

    assert_eq!(message.pointer("/body/scopes/0/line"), Some(&json!(3)));
    assert_eq!(
        message.pointer("/body/scopes/0/source/path"),
        Some(&json!(identity.to_string()))
    );
    // A scope with no source keeps its shape.
    assert_eq!(
        message.pointer("/body/scopes/1/expensive"),
        Some(&json!(true))
    );
}

#[test]
fn set_breakpoints_response_remaps_adapter_reported_positions() {
    let (bridge, identity) = bridge_with_cell();
    let dump = dump_path(&bridge, &identity);

    let mut message = json!({
        "type": "response", "command": "setBreakpoints", "success": true,
        "body": {"breakpoints": [
            {"verified": true, "line": 30, "column": 0, "source": {"path": dump}},
        ]}
    });
    bridge.rewrite_inbound(&mut message);

    assert_eq!(
        message.pointer("/body/breakpoints/0/line"),
        Some(&json!(3))
    );
    assert_eq!(
        message.pointer("/body/breakpoints/0/source/path"),
        Some(&json!(identity.to_string()))
    );
    assert_eq!(
        message.pointer("/body/breakpoints/0/verified"),
        Some(&json!(true))
    );
}

#[test]
fn shutdown_tears_down_dumps_and_registry() {
    let (bridge, identity) = bridge_with_cell();
    let dump = dump_path(&bridge, &identity);
    assert!(std::path::Path::new(&dump).exists());

    bridge.shutdown();

    assert!(!std::path::Path::new(&dump).exists());
    assert!(bridge.registry().by_identity(&identity).is_none());

    let mut message = json!({
        "type": "event", "event": "output",
        "body": {"source": {"path": dump}}
    });
    let before = message.clone();
    bridge.rewrite_inbound(&mut message);
    assert_eq!(message, before);
}
