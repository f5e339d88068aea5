use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_goroot(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("sigtable-fixture-{}-{}", name, nanos))
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn write_fixture_tree(goroot: &Path) {
    write_file(
        goroot,
        "src/io/io.go",
        r#"// Package io is a fixture.
package io

type Reader interface {
	Read(p []byte) (n int, err error)
}

type ByteReader interface {
	ReadByte() (byte, error)
}

type Closer interface {
	Close() error
}

type ReadCloser interface {
	Reader
	Closer
}
"#,
    );
    write_file(
        goroot,
        "src/io/io_windows.go",
        "package io\n\ntype WindowsOnly interface {\n\tHandle() uintptr\n}\n",
    );
    write_file(
        goroot,
        "src/bytes/reader.go",
        r#"package bytes

import "io"

type ByteScanner interface {
	io.ByteReader
}

type Sink interface {
	Close() error
}
"#,
    );
    write_file(
        goroot,
        "src/io/internal/secret.go",
        "package internal\n\ntype Hidden interface {\n\tSecret() string\n}\n",
    );
    write_file(
        goroot,
        "src/net/http/server.go",
        r#"package http

import (
	"io"
	"net/url"
)

type Header map[string][]string

type HandlerFunc func(w io.Writer, r *Request)

type Request struct {
	URL *url.URL
}

type Hijacker interface {
	Hijack() (io.ReadCloser, error)
}

func (f HandlerFunc) ServeHTTP(w io.Writer, r *Request) {
	f(w, r)
}
"#,
    );
    write_file(goroot, "src/net/url/url.go", "package url\n\ntype URL struct{}\n");
    write_file(
        goroot,
        "src/io/writer.go",
        "package io\n\ntype Writer interface {\n\tWrite(p []byte) (n int, err error)\n}\n",
    );
}

fn write_config(goroot: &Path) -> PathBuf {
    let path = goroot.join("sigtable.json");
    fs::write(
        &path,
        r#"{"scopes": ["net/http", "io/internal", "bytes", "io", ""]}"#,
    )
    .expect("config should be written");
    path
}

#[test]
fn generates_grouped_go_table_for_fixture_tree() {
    let bin = env!("CARGO_BIN_EXE_st-cli");
    let goroot = temp_goroot("go");
    write_fixture_tree(&goroot);
    let config = write_config(&goroot);

    let output = Command::new(bin)
        .arg("--goroot")
        .arg(&goroot)
        .arg("--config")
        .arg(&config)
        .output()
        .expect("cli should execute");
    if !output.status.success() {
        panic!(
            "generation failed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = concat!(
        "// Generated by sigtable. DO NOT EDIT.\n",
        "\n",
        "package interfacer\n",
        "\n",
        "var pkgs = map[string]struct{}{\n",
        "\t\"\": struct{}{},\n",
        "\t\"io\": struct{}{},\n",
        "\t\"bytes\": struct{}{},\n",
        "\t\"net/http\": struct{}{},\n",
        "\t\"io/internal\": struct{}{},\n",
        "}\n",
        "\n",
        "var ifaces = map[string]string{\n",
        "\t\"Error()(string)\": \"error\",\n",
        "\t\"ReadByte()(byte, error)\": \"io.ByteReader\",\n",
        "\t\"Close()(error)\": \"io.Closer\",\n",
        "\t\"Close()(error); Read([]byte)(int, error)\": \"io.ReadCloser\",\n",
        "\t\"Read([]byte)(int, error)\": \"io.Reader\",\n",
        "\t\"Write([]byte)(int, error)\": \"io.Writer\",\n",
        "\t\"Hijack()(io.ReadCloser, error)\": \"net/http.Hijacker\",\n",
        "}\n",
        "\n",
        "var funcs = map[string]string{\n",
        "\t\"(io.Writer, *net/http.Request)()\": \"net/http.HandlerFunc\",\n",
        "}\n",
    );
    assert_eq!(stdout, expected);

    let _ = fs::remove_dir_all(goroot);
}

#[test]
fn json_output_and_repeat_runs_are_identical() {
    let bin = env!("CARGO_BIN_EXE_st-cli");
    let goroot = temp_goroot("json");
    write_fixture_tree(&goroot);
    let config = write_config(&goroot);

    let run = |out: &Path| {
        let status = Command::new(bin)
            .arg("--goroot")
            .arg(&goroot)
            .arg("--config")
            .arg(&config)
            .arg("--format")
            .arg("json")
            .arg("-o")
            .arg(out)
            .status()
            .expect("cli should execute");
        assert!(status.success());
        fs::read_to_string(out).expect("output should be written")
    };
    let first = run(&goroot.join("first.json"));
    let second = run(&goroot.join("second.json"));
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).expect("valid json");
    assert_eq!(value["scopes"][0], "");
    assert_eq!(value["functions"][0]["qualifiedName"], "net/http.HandlerFunc");

    let _ = fs::remove_dir_all(goroot);
}

#[test]
fn missing_scope_fails_with_error_on_stderr() {
    let bin = env!("CARGO_BIN_EXE_st-cli");
    let goroot = temp_goroot("missing");
    write_fixture_tree(&goroot);
    let config = goroot.join("broken.json");
    fs::write(&config, r#"{"scopes": ["io", "does/not/exist"]}"#).expect("config");
    let out = goroot.join("never.go");

    let output = Command::new(bin)
        .arg("--goroot")
        .arg(&goroot)
        .arg("--config")
        .arg(&config)
        .arg("-o")
        .arg(&out)
        .output()
        .expect("cli should execute");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR SCOPE_NOT_FOUND:"), "stderr: {}", stderr);
    assert!(!out.exists());

    let _ = fs::remove_dir_all(goroot);
}
