//! Shell history reading.
//!
//! History files are read from the end so only the most recent lines are
//! touched, no matter how large the file has grown. Bytes that are not
//! valid UTF-8 are dropped rather than failing the read.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Bytes read per backward step.
const CHUNK_SIZE: u64 = 8 * 1024;

/// Shells whose history files are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// Extended history format: `: <epoch>:<duration>;<command>`.
    Zsh,
    /// One command per line.
    Bash,
}

impl Shell {
    /// Every supported shell, in collection order.
    pub const ALL: [Shell; 2] = [Shell::Zsh, Shell::Bash];

    pub fn name(self) -> &'static str {
        match self {
            Shell::Zsh => "zsh",
            Shell::Bash => "bash",
        }
    }

    /// `~/.<shell>_history`
    pub fn history_file(self, home: &Path) -> PathBuf {
        home.join(format!(".{}_history", self.name()))
    }

    /// Source tag stored with every command read from this shell.
    pub fn source_tag(self) -> String {
        format!("{}_history", self.name())
    }

    /// Extracts the command text from a raw history line.
    pub fn clean_line(self, line: &str) -> String {
        match self {
            Shell::Zsh => clean_zsh_line(line),
            Shell::Bash => line.trim().to_string(),
        }
    }
}

impl std::fmt::Display for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Strips the zsh extended-history prefix (`: 1678901234:0;`).
fn clean_zsh_line(line: &str) -> String {
    if line.starts_with(": ") {
        if let Some((_, command)) = line.split_once(';') {
            return command.trim().to_string();
        }
    }
    line.trim().to_string()
}

/// Reads up to `max_lines` lines from the end of `path`.
///
/// Lines come back most recent first. Every newline byte completes a
/// line, so a trailing newline yields an empty first entry; callers skip
/// blanks. The partial line at the very start of the file is included
/// once the start is reached.
pub fn tail_lines(path: &Path, max_lines: usize) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    if max_lines == 0 {
        return Ok(lines);
    }

    let mut file = File::open(path)?;
    let mut pos = file.seek(SeekFrom::End(0))?;

    // Bytes of the current line, collected back to front.
    let mut reversed: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE as usize];

    while pos > 0 {
        let step = pos.min(CHUNK_SIZE);
        pos -= step;
        file.seek(SeekFrom::Start(pos))?;
        let buf = &mut chunk[..step as usize];
        file.read_exact(buf)?;

        for &byte in buf.iter().rev() {
            if byte == b'\n' {
                lines.push(decode_reversed(&reversed));
                reversed.clear();
                if lines.len() >= max_lines {
                    return Ok(lines);
                }
            } else {
                reversed.push(byte);
            }
        }
    }

    if !reversed.is_empty() {
        lines.push(decode_reversed(&reversed));
    }

    Ok(lines)
}

/// Decodes a back-to-front byte buffer, dropping invalid UTF-8.
fn decode_reversed(reversed: &[u8]) -> String {
    let bytes: Vec<u8> = reversed.iter().rev().copied().collect();
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn history_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write history");
        file.flush().expect("Failed to flush");
        file
    }

    #[test]
    fn test_tail_lines_most_recent_first() {
        let file = history_file(b"first\nsecond\nthird");
        let lines = tail_lines(file.path(), 10).unwrap();
        assert_eq!(lines, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_tail_lines_trailing_newline_counts_as_line() {
        let file = history_file(b"one\ntwo\nthree\n");
        let lines = tail_lines(file.path(), 3).unwrap();
        assert_eq!(lines, vec!["", "three", "two"]);
    }

    #[test]
    fn test_tail_lines_respects_limit() {
        let content: String = (0..500).map(|i| format!("cmd {i}\n")).collect();
        let file = history_file(content.as_bytes());
        let lines = tail_lines(file.path(), 4).unwrap();
        assert_eq!(lines, vec!["", "cmd 499", "cmd 498", "cmd 497"]);
    }

    #[test]
    fn test_tail_lines_crosses_chunk_boundaries() {
        let long = "x".repeat(CHUNK_SIZE as usize + 17);
        let content = format!("head\n{long}\ntail");
        let file = history_file(content.as_bytes());
        let lines = tail_lines(file.path(), 10).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "tail");
        assert_eq!(lines[1], long);
        assert_eq!(lines[2], "head");
    }

    #[test]
    fn test_tail_lines_drops_invalid_utf8() {
        let file = history_file(b"ok line\nbad \xff\xfe bytes\n\xe2\x9c\x93 done");
        let lines = tail_lines(file.path(), 10).unwrap();
        assert_eq!(lines, vec!["\u{2713} done", "bad  bytes", "ok line"]);
    }

    #[test]
    fn test_tail_lines_empty_file_and_zero_limit() {
        let file = history_file(b"");
        assert!(tail_lines(file.path(), 10).unwrap().is_empty());

        let file = history_file(b"a\nb\n");
        assert!(tail_lines(file.path(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_tail_lines_missing_file() {
        let err = tail_lines(Path::new("/nonexistent/.zsh_history"), 10).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_clean_zsh_line() {
        assert_eq!(
            Shell::Zsh.clean_line(": 1678901234:0;kubectl get pods -n prod"),
            "kubectl get pods -n prod"
        );
        assert_eq!(
            Shell::Zsh.clean_line(": 1678901234:0;echo a; echo b"),
            "echo a; echo b"
        );
        assert_eq!(Shell::Zsh.clean_line("  plain command  "), "plain command");
    }

    #[test]
    fn test_clean_bash_line_keeps_semicolons() {
        assert_eq!(Shell::Bash.clean_line(": not zsh;really"), ": not zsh;really");
    }

    #[test]
    fn test_shell_paths_and_tags() {
        let home = Path::new("/home/dev");
        assert_eq!(
            Shell::Zsh.history_file(home),
            PathBuf::from("/home/dev/.zsh_history")
        );
        assert_eq!(Shell::Bash.source_tag(), "bash_history");
        assert_eq!(Shell::Zsh.to_string(), "zsh");
    }
}
