//! `tree-patch` — apply a JSON Patch (RFC 6902) to a document.
//!
//! Usage:
//!   tree-patch '<patch-array-json>'
//!
//! The document is read from stdin. The patch operations are the first
//! argument. Prints `{"doc": .., "revert": ..}` with the patched document
//! and the inverse patch that undoes it.

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use json_tree_edit::patch::{apply_json, encode_patch};
use json_tree_edit::Json;

fn run(doc_text: &str, patch_text: &str) -> Result<String, String> {
    let doc = Json::parse(doc_text).map_err(|e| format!("invalid document: {e}"))?;
    let patch: Value =
        serde_json::from_str(patch_text).map_err(|e| format!("invalid patch: {e}"))?;

    let result = apply_json(&doc, &patch);
    if let Some(error) = result.error {
        return Err(error.to_string());
    }

    let output = json!({
        "doc": Value::from(&result.doc),
        "revert": encode_patch(&result.revert),
    });
    serde_json::to_string(&output).map_err(|e| e.to_string())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let patch = match args.get(1) {
        Some(p) => p.clone(),
        None => {
            eprintln!("First argument must be a JSON patch array.");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run(buf.trim(), &patch) {
        Ok(result) => {
            io::stdout().write_all(result.as_bytes()).unwrap();
            io::stdout().write_all(b"\n").unwrap();
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
