//! Utility to create AFL fuzzing corpus data.
//!
//! Writes seed inputs for the classification and packing modes of the fuzz
//! target into the `fuzz/corpus` directory.
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use plcrpc::{JsonSerializer, RequestSerializer, RpcRequest};

const CORPUS_DIR: &str = "fuzz/corpus";

const CLASSIFY: u8 = 0;
const PACK: u8 = 1;

const REPLY_SEEDS: &[(&str, &str)] = &[
    ("result.bin", r#"{"id":1,"result":true}"#),
    ("error.bin", r#"{"id":1,"error":{"code":1,"message":"Permission denied"}}"#),
    (
        "batch.bin",
        r#"[{"id":1,"result":[1,2]},{"id":2,"error":{"code":200,"message":"Address not found","data":null}}]"#,
    ),
    ("null_error.bin", r#"{"id":1,"result":null,"error":null}"#),
    ("empty_batch.bin", "[]"),
];

fn seed_requests() -> Vec<RpcRequest> {
    vec![
        RpcRequest::new(1, "Api.Ping"),
        RpcRequest::new(2, "PlcProgram.Read").with_param("var", "\"DB1\".Speed"),
        RpcRequest::new(3, "PlcProgram.Write")
            .with_param("var", "\"DB1\".Target")
            .with_param("value", 42),
        RpcRequest::new("login", "Api.Login")
            .with_param("user", "admin")
            .with_param("password", ""),
    ]
}

fn save(path: &Path, mode: &[u8], payload: &[u8]) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(mode)?;
    f.write_all(payload)?;
    Ok(())
}

fn main() -> std::io::Result<()> {
    fs::create_dir_all(CORPUS_DIR)?;
    let dir = Path::new(CORPUS_DIR);
    for (name, body) in REPLY_SEEDS {
        save(&dir.join(name), &[CLASSIFY], body.as_bytes())?;
    }

    let mut lines = Vec::new();
    for request in seed_requests() {
        let encoded = JsonSerializer
            .serialize(&request)
            .map_err(std::io::Error::other)?;
        if !lines.is_empty() {
            lines.push(b'\n');
        }
        lines.extend_from_slice(encoded.as_bytes());
    }
    save(&dir.join("pack_tight.bin"), &[PACK, 8], &lines)?;
    save(&dir.join("pack_roomy.bin"), &[PACK, 255], &lines)?;
    Ok(())
}
