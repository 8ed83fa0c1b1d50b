//! Helpers for tests that stand a shell script in for the memvid binary.

use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `memvid` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("memvid");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A fake binary mimicking the real CLI's output shapes.
///
/// Every invocation appends its arguments (one line) to `calls.log` next to
/// the script. `ingest` also records the staged file's presence and fails
/// when the title is `fail`.
pub const FAKE_MEMVID: &str = r#"
LOG="$(dirname "$0")/calls.log"
echo "$*" >> "$LOG"
case "$1" in
  create)
    : > "$2"
    echo "{\"status\": \"ok\", \"path\": \"$2\"}"
    ;;
  put)
    echo '{"status": "ok", "sequence": 7}'
    ;;
  ingest)
    if [ -f "$3" ]; then echo "staged-present $3" >> "$LOG"; fi
    if [ "$5" = "fail" ]; then echo "ingest exploded" >&2; exit 2; fi
    echo "{\"status\": \"ok\", \"sequence\": 9, \"title\": \"${5:-$(basename "$3")}\"}"
    ;;
  search)
    echo "{\"query\": \"$6\", \"total_hits\": 0, \"elapsed_ms\": 1, \"hits\": [], \"top_k\": $4}"
    ;;
  stats)
    echo '{"frame_count": 3, "has_lex_index": true, "has_vec_index": false, "has_time_index": true}'
    ;;
  timeline)
    echo "{\"entries\": [], \"limit\": $4}"
    ;;
  verify)
    if [ "$3" = "--deep" ]; then D=true; else D=false; fi
    echo "{\"status\": \"Passed\", \"deep\": $D}"
    ;;
  *)
    echo "unknown command $1" >&2
    exit 64
    ;;
esac
"#;

/// Lines recorded by [`FAKE_MEMVID`], or empty when it never ran.
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
