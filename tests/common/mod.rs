#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut dir = std::env::temp_dir();
    dir.push(format!("fwrec_{prefix}_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(path: &Path, data: &str) {
    std::fs::write(path, data).unwrap();
}

pub fn run_fwrec(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fwrec"))
        .args(args)
        .output()
        .unwrap()
}

pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("fwrec failed: {stderr}");
    }
}

pub fn read_nonempty_lines(path: &Path) -> Vec<String> {
    let text = std::fs::read_to_string(path).unwrap();
    text.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Two extended-linear banks, 40 bytes of data and an entry point.
pub const SAMPLE_HEX: &str = ":020000040800F2\n\
:10000000000102030405060708090A0B0C0D0E0F78\n\
:10001000101112131415161718191A1B1C1D1E1F68\n\
:020000042000DA\n\
:08000000A0A1A2A3A4A5A6A7DC\n\
:0400000508000000EF\n\
:00000001FF\n";
