//! Save, list, show and compare revisions through the binary

use crate::common::cli::strip_ansi;
use crate::common::TestSite;

const DAY: u64 = 86_400;
/// 2023-11-14 00:00:00 UTC
const T0: u64 = 1_699_920_000;

fn numbered(prefix: &str, count: usize) -> String {
    (0..count).map(|i| format!("{} {}\n", prefix, i)).collect()
}

#[test]
fn test_save_show_and_log() {
    let site = TestSite::new();

    let first = site.save("page.md", "first\n", T0, "ana");
    assert!(first.contains_stdout("New document"));
    assert_eq!(first.parse_revision_id(), None);

    let second = site.save("page.md", "second\n", T0 + DAY, "ana");
    assert_eq!(second.parse_revision_id(), Some(T0 + DAY));
    site.save("page.md", "third\n", T0 + 2 * DAY, "bo");

    assert_eq!(site.read("page.md"), "third\n");

    let v1 = (T0 + DAY).to_string();
    let v2 = (T0 + 2 * DAY).to_string();
    let raw = site
        .folio(&["show", "page.md", "--version", &v1, "--raw"])
        .assert_success()
        .unwrap();
    assert_eq!(raw.stdout, "first\n");
    let raw = site
        .folio(&["show", "page.md", "--version", &v2, "--raw"])
        .assert_success()
        .unwrap();
    assert_eq!(raw.stdout, "second\n");

    let shown = site
        .folio(&["show", "page.md", "--version", &v1])
        .assert_success()
        .unwrap();
    let out = strip_ansi(&shown.stdout);
    assert!(out.contains("NOTE: This is a previous version dated 2023-11-15 00:00:00."));
    assert!(out.ends_with("first\n"));

    let current = site.folio(&["show", "page.md"]).assert_success().unwrap();
    assert!(!current.contains_stdout("NOTE:"));
    assert!(current.stdout.ends_with("third\n"));

    let log = site.folio(&["log", "page.md"]).assert_success().unwrap();
    let out = strip_ansi(&log.stdout);
    assert!(out.contains("Current"));
    assert!(out.contains("Created"));
    assert!(out.contains(&v1));
    assert!(out.contains(&v2));
    assert!(out.contains("bo (127.0.0.1)"));
}

#[test]
fn test_same_day_saves_merge() {
    let site = TestSite::new();
    let a = numbered("a", 20);
    let b = a.replace("a 5\n", "b 5\n");
    let c = b.replace("a 12\n", "c 12\n");

    site.save("page.md", &a, T0, "ana");
    let t_b = T0 + DAY + 3_600;
    let t_c = T0 + DAY + 7_200;
    site.save("page.md", &b, t_b, "ana");
    let merged = site.save("page.md", &c, t_c, "ana");

    let out = strip_ansi(&merged.stdout);
    assert!(out.contains("Merged into today's change-log entry"));
    assert!(out.contains("[1 folded]"));
    assert_eq!(merged.parse_revision_id(), Some(t_c));

    let t_c_arg = t_c.to_string();
    let raw = site
        .folio(&["show", "page.md", "--version", &t_c_arg, "--raw"])
        .assert_success()
        .unwrap();
    assert_eq!(raw.stdout, a);

    let t_b_arg = t_b.to_string();
    let missing = site
        .folio(&["show", "page.md", "--version", &t_b_arg, "--raw"])
        .assert_failure()
        .unwrap();
    assert!(missing.contains_stderr("not found"));
}

#[test]
fn test_diff_between_revisions() {
    let site = TestSite::new();
    let base = numbered("line", 30);
    let edited = base.replace("line 4\n", "line four\n");

    site.save("page.md", &base, T0, "ana");
    site.save("page.md", &edited, T0 + DAY, "ana");

    let v1 = (T0 + DAY).to_string();
    let diff = site
        .folio(&["diff", "page.md", &v1, "~"])
        .assert_success()
        .unwrap();
    let out = strip_ansi(&diff.stdout);
    assert!(out.contains("-line 4\n"));
    assert!(out.contains("+line four\n"));
    assert!(out.contains("+1 -1"));

    let same = site
        .folio(&["diff", "page.md", "~", "current"])
        .assert_success()
        .unwrap();
    assert!(strip_ansi(&same.stdout).contains("No differences"));
}

#[test]
fn test_save_from_file_with_note() {
    let site = TestSite::new();
    std::fs::write(site.doc("draft.txt"), "from a file\n").unwrap();

    site.save("page.md", "start\n", T0, "ana");
    let at = (T0 + DAY).to_string();
    site.folio(&[
        "save", "page.md", "--file", "draft.txt", "--at", &at, "--note", "imported",
    ])
    .assert_success()
    .unwrap();

    assert_eq!(site.read("page.md"), "from a file\n");
    let log = site.folio(&["log", "page.md"]).assert_success().unwrap();
    assert!(log.contains_stdout("imported"));
}

#[test]
fn test_crlf_is_normalized() {
    let site = TestSite::new();
    site.save("page.md", "one\r\ntwo\r\n", T0, "ana");
    assert_eq!(site.read("page.md"), "one\ntwo\n");

    let keep = TestSite::new().with_config("[editor]\nunix_eol = false\n");
    keep.save("page.md", "one\r\ntwo\r\n", T0, "ana");
    assert_eq!(keep.read("page.md"), "one\r\ntwo\r\n");
}

#[test]
fn test_status_reports_documents() {
    let site = TestSite::new();
    site.save("page.md", "one\n", T0, "ana");
    site.save("page.md", "two\n", T0 + DAY, "ana");
    site.save("notes/other.md", "solo\n", T0, "ana");
    std::fs::write(site.doc("image.png"), [0u8, 1, 2]).unwrap();

    let status = site.folio(&["status"]).assert_success().unwrap();
    let out = strip_ansi(&status.stdout);
    assert!(out.contains("page.md"));
    assert!(out.contains("other.md"));
    assert!(!out.contains("image.png"));
    assert!(!out.contains(".vers;"));
    assert!(out.contains("Documents:     2 (1 with history)"));
}
