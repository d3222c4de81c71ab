use std::fs;

use proto3_lines::{file::File, ErrorCategory, Parser};
use tempfile::TempDir;

const SOURCE: &str = "syntax = \"proto3\";
package sample;

service Greeter {
    rpc SayHello(HelloRequest) returns (HelloReply);
}
";

#[test]
fn open_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("greeter.proto");
    fs::write(&path, SOURCE).unwrap();

    let file = File::open(&path).unwrap();
    assert_eq!(file.path(), Some(path.as_path()));
    assert_eq!(file.source(), SOURCE);
    assert_eq!(file.model().package_name(), "sample");
    assert_eq!(file.into_model().services()[0].name(), "Greeter");
}

#[test]
fn read_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("greeter.proto");
    fs::write(&path, SOURCE).unwrap();

    let mut parser = Parser::new();
    parser.read_file(&path).unwrap();
    assert_eq!(parser.syntax(), "proto3");
    assert_eq!(parser.services()[0].rpcs()[0].request(), "HelloRequest");
}

#[test]
fn file_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notfound.proto");

    let err = File::open(&path).unwrap_err();
    assert!(err.is_io());
    assert!(!err.is_parse());
    assert!(err.as_parse_error().is_none());
    assert_eq!(err.file(), path.to_str());

    let err = Parser::new().read_file(&path).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.proto");
    fs::write(&path, b"syntax = \"proto3\";\npackage \xff;\n").unwrap();

    let err = File::open(&path).unwrap_err();
    assert!(err.is_parse());
    assert!(!err.is_io());
    assert!(err.as_parse_error().is_none());
    assert_eq!(
        err.to_string(),
        format!("file '{}' is not valid utf-8", path.display())
    );
}

#[test]
fn parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.proto");
    fs::write(&path, "syntax = \"proto3\";\npackage sample;\nimport 'a.proto'\n").unwrap();

    let err = File::open(&path).unwrap_err();
    assert!(err.is_parse());

    let name = path.display().to_string();
    assert_eq!(err.file(), Some(name.as_str()));

    let parse_err = err.as_parse_error().unwrap();
    assert_eq!(parse_err.category(), ErrorCategory::PunctuationMissing);
    assert_eq!(parse_err.file(), name);
    assert_eq!(parse_err.fragment(), Some("import 'a.proto'"));
    assert_eq!(
        format!("{:?}", err),
        format!("{name}:3:1: import statement is missing ';': 'import 'a.proto''")
    );
}

#[test]
fn from_source() {
    let file = File::from_source(SOURCE).unwrap();
    assert_eq!(file.path(), None);
    assert_eq!(file.model().services()[0].rpcs()[0].response(), "HelloReply");

    let err = File::from_source("package sample;").unwrap_err();
    assert_eq!(err.file(), "");
    assert_eq!(err.category(), ErrorCategory::StructuralCount);
}
