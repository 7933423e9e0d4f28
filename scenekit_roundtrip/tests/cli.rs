// Copyright 2026 the Scenekit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exit codes and output of the `node-roundtrip` binary.

use std::path::PathBuf;
use std::process::{Command, Output};

use scenekit_core::Rect;
use scenekit_core::codec;
use scenekit_core::color::Color;
use scenekit_core::node::Node;
use scenekit_core::transform::Transform;

fn scene() -> Node {
    Node::container([Node::transform(
        Transform::scale(2.0, 2.0),
        Node::color(Color::RED, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap(),
    )
    .unwrap()])
    .unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

fn write_stream(name: &str, bytes: &[u8]) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn run(args: &[&std::ffi::OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_node-roundtrip"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn valid_stream_exits_zero_and_writes_output() {
    let bytes = codec::serialize(&scene());
    let input = write_stream("valid.sknd", &bytes);
    let output = temp_path("valid.out.sknd");
    let _ = std::fs::remove_file(&output);

    let out = run(&[input.as_os_str(), output.as_os_str()]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    assert_eq!(std::fs::read(&output).unwrap(), bytes);
}

#[test]
fn truncated_stream_exits_one() {
    let bytes = codec::serialize(&scene());
    let input = write_stream("truncated.sknd", &bytes[..bytes.len() - 3]);

    let out = run(&[input.as_os_str()]);
    assert_eq!(out.status.code(), Some(1), "{out:?}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("truncated"), "{stderr}");
}

#[test]
fn missing_input_exits_one() {
    let input = temp_path("does-not-exist.sknd");
    let out = run(&[input.as_os_str()]);
    assert_eq!(out.status.code(), Some(1), "{out:?}");
    assert!(String::from_utf8_lossy(&out.stderr).contains("reading"));
}

#[test]
fn bad_arguments_exit_one() {
    let out = run(&[]);
    assert_eq!(out.status.code(), Some(1), "{out:?}");
}

#[test]
fn dump_and_json_go_to_stdout() {
    let input = write_stream("dump.sknd", &codec::serialize(&scene()));

    let out = run(&[input.as_os_str(), "--dump".as_ref()]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("container [0, 0, 20, 20]"), "{stdout}");
    assert_eq!(stdout.lines().count(), 3);

    let out = run(&[input.as_os_str(), "--json".as_ref()]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("\"kind\": \"container\""), "{stdout}");
}

#[test]
fn untrusted_limits_reject_deep_trees() {
    let mut node = Node::color(Color::BLUE, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    for _ in 0..100 {
        node = Node::opacity(1.0, node).unwrap();
    }
    let input = write_stream("deep.sknd", &codec::serialize(&node));

    let out = run(&[input.as_os_str()]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    let out = run(&[input.as_os_str(), "--untrusted".as_ref()]);
    assert_eq!(out.status.code(), Some(1), "{out:?}");
}
