//! `folio config` subcommands

use crate::common::cli::strip_ansi;
use crate::common::TestSite;

#[test]
fn test_set_and_get() {
    let site = TestSite::new();

    site.folio(&["config", "set", "history.codec", "external"])
        .assert_success()
        .unwrap();
    let get = site
        .folio(&["config", "get", "history.codec"])
        .assert_success()
        .unwrap();
    assert_eq!(get.stdout.trim(), "external");

    site.folio(&["config", "set", "history.extensions", "md, TXT"])
        .assert_success()
        .unwrap();
    let get = site
        .folio(&["config", "get", "history.extensions"])
        .assert_success()
        .unwrap();
    assert_eq!(get.stdout.trim(), "md,txt");

    let written = std::fs::read_to_string(site.doc("folio-config.toml")).unwrap();
    assert!(written.contains("[history]"));
    assert!(written.contains("codec = \"external\""));
}

#[test]
fn test_invalid_values_are_rejected() {
    let site = TestSite::new();

    let bad_codec = site
        .folio(&["config", "set", "history.codec", "gnu"])
        .assert_failure()
        .unwrap();
    assert!(bad_codec.contains_stderr("unknown codec"));

    site.folio(&["config", "set", "history.enabled", "maybe"])
        .assert_failure()
        .unwrap();
    site.folio(&["config", "get", "nope.key"])
        .assert_failure()
        .unwrap();
    assert!(!site.doc("folio-config.toml").exists());
}

#[test]
fn test_list_and_path() {
    let site = TestSite::new();

    let path = site.folio(&["config", "path"]).assert_success().unwrap();
    assert!(path.contains_stdout("folio-config.toml"));
    assert!(path.contains_stdout("--create"));

    site.folio(&["config", "path", "--create"])
        .assert_success()
        .unwrap();
    assert!(site.doc("folio-config.toml").exists());

    let list = site.folio(&["config", "list"]).assert_success().unwrap();
    let out = strip_ansi(&list.stdout);
    assert!(out.contains("[history]"));
    assert!(out.contains("[editor]"));
    assert!(out.contains("codec = builtin"));
    assert!(out.contains("default_ip = 127.0.0.1"));
}
