//! Edge cases: unsupported documents, disabled history, broken stores

use crate::common::cli::strip_ansi;
use crate::common::TestSite;

const DAY: u64 = 86_400;
const T0: u64 = 1_699_920_000;

#[test]
fn test_unsupported_document_has_no_history() {
    let site = TestSite::new();
    site.save("data.bin", "one\n", T0, "ana");
    let second = site.save("data.bin", "two\n", T0 + DAY, "ana");
    assert_eq!(second.parse_revision_id(), None);
    assert!(!site.doc(".vers;data.bin").exists());

    let v = (T0 + DAY).to_string();
    let result = site
        .folio(&["show", "data.bin", "--version", &v, "--raw"])
        .assert_failure()
        .unwrap();
    assert!(result.contains_stderr("not of a supported type"));
}

#[test]
fn test_disabled_history_records_ledger_only() {
    let site = TestSite::new().with_config("[history]\nenabled = false\n");
    site.save("page.md", "one\n", T0, "ana");
    let second = site.save("page.md", "two\n", T0 + DAY, "ana");

    assert_eq!(second.parse_revision_id(), None);
    assert!(!site.doc(".vers;page.md").exists());
    assert!(site.doc(".props;page.md").exists());
}

#[test]
fn test_log_without_history_fails() {
    let site = TestSite::new();
    site.save("page.md", "only\n", T0, "ana");

    let result = site.folio(&["log", "page.md"]).assert_failure().unwrap();
    assert!(result.contains_stderr("no versions found"));
}

#[test]
fn test_broken_store_warns_unless_strict() {
    let site = TestSite::new();
    site.save("page.md", "one\n", T0, "ana");
    site.save("page.md", "two\n", T0 + DAY, "ana");
    std::fs::write(site.doc(".vers;page.md"), "{broken").unwrap();

    let lenient = site.save("page.md", "three\n", T0 + 2 * DAY, "ana");
    assert!(strip_ansi(&lenient.stdout).contains("warning:"));
    assert_eq!(site.read("page.md"), "three\n");

    let strict = TestSite::new().with_config("[history]\nstrict = true\n");
    strict.save("page.md", "one\n", T0, "ana");
    strict.save("page.md", "two\n", T0 + DAY, "ana");
    std::fs::write(strict.doc(".vers;page.md"), "{broken").unwrap();

    let at = (T0 + 2 * DAY).to_string();
    let result = strict
        .folio(&["save", "page.md", "--at", &at, "--user", "ana"])
        .stdin("three\n")
        .assert_failure()
        .unwrap();
    assert!(result.contains_stderr("Failed to record revision"));
}

#[test]
fn test_bad_selector_is_rejected() {
    let site = TestSite::new();
    site.save("page.md", "one\n", T0, "ana");
    site.save("page.md", "two\n", T0 + DAY, "ana");

    let result = site
        .folio(&["diff", "page.md", "yesterday", "~"])
        .assert_failure()
        .unwrap();
    assert!(result.contains_stderr("neither '~' nor a revision id"));
}

#[test]
fn test_legacy_store_is_readable() {
    let site = TestSite::new();
    site.save("page.md", "old\n", T0, "ana");
    site.save("page.md", "new\n", T0 + DAY, "ana");
    std::fs::remove_file(site.doc(".vers;page.md")).unwrap();
    std::fs::write(
        site.doc(".ver;page.md"),
        format!("{}:\n- rewrite\n- \"legacy old\\n\"\nroot: \"new\\n\"\n", T0 + DAY),
    )
    .unwrap();

    let v = (T0 + DAY).to_string();
    let raw = site
        .folio(&["show", "page.md", "--version", &v, "--raw"])
        .assert_success()
        .unwrap();
    assert_eq!(raw.stdout, "legacy old\n");
    assert!(!site.doc(".vers;page.md").exists());
}

#[test]
fn test_out_of_range_timestamps() {
    let site = TestSite::new();
    site.save("page.md", "one\n", T0, "ana");

    let max = u64::MAX.to_string();
    let result = site
        .folio(&["save", "page.md", "--at", &max, "--user", "ana"])
        .stdin("two\n")
        .assert_failure()
        .unwrap();
    assert!(result.contains_stderr("invalid revision id"));
    assert_eq!(site.read("page.md"), "one\n");

    // A hand-edited change log must not take `log` down
    site.save("page.md", "two\n", T0 + DAY, "ana");
    std::fs::write(
        site.doc(".props;page.md"),
        format!(
            r#"{{"created":[{},"127.0.0.1","ana"],"change-log":[[{},"127.0.0.1","ana"],[{},"127.0.0.1","ana"]]}}"#,
            T0,
            u64::MAX,
            T0 + DAY
        ),
    )
    .unwrap();
    let log = site.folio(&["log", "page.md"]).assert_success().unwrap();
    assert!(strip_ansi(&log.stdout).contains("Unknown time"));
}
