//! Owns file buffers and maps compact offsets to `(file, line, column)`.

use crate::source_location::{SourceLocation, SourceRange};
use std::fs;
use std::io;
use std::path::Path;

/// Identifies a loaded file. `0` is reserved for "no file" / invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileID(u32);

impl FileID {
    pub const INVALID: FileID = FileID(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

struct FileEntry {
    filename: String,
    content: String,
    /// Global offset of this file's first byte.
    start_offset: u32,
    /// `line_offsets[i]` is the start offset (global) of line `i + 2`; line 1
    /// always starts at `start_offset`.
    line_offsets: Vec<u32>,
}

impl FileEntry {
    fn end_offset(&self) -> u32 {
        self.start_offset + self.content.len() as u32
    }

    fn compute_line_offsets(content: &str, start_offset: u32) -> Vec<u32> {
        let bytes = content.as_bytes();
        let mut offsets = Vec::new();
        let mut i = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    offsets.push(start_offset + (i + 1) as u32);
                    i += 1;
                }
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        offsets.push(start_offset + (i + 2) as u32);
                        i += 2;
                    } else {
                        offsets.push(start_offset + (i + 1) as u32);
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        offsets
    }
}

/// Process-wide mapping from a 32-bit offset to `(file, byte position)`.
///
/// Offset `0` is reserved for the invalid location; each loaded file
/// reserves `content.len() + 1` offsets so that the position one-past the
/// end of a file never collides with the first byte of the next.
#[derive(Default)]
pub struct SourceManager {
    files: Vec<FileEntry>,
    next_offset: u32,
}

impl SourceManager {
    pub fn new() -> Self {
        SourceManager {
            files: Vec::new(),
            next_offset: 1,
        }
    }

    /// Load a file from disk. Returns `FileID::INVALID` if the file cannot
    /// be read.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> FileID {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => self.create_buffer(path.display().to_string(), content),
            Err(_) => FileID::INVALID,
        }
    }

    pub fn load_file_checked(&mut self, path: impl AsRef<Path>) -> io::Result<FileID> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(self.create_buffer(path.display().to_string(), content))
    }

    /// Register an in-memory buffer under a synthetic filename.
    pub fn create_buffer(&mut self, filename: String, content: String) -> FileID {
        let start_offset = self.next_offset;
        let line_offsets = FileEntry::compute_line_offsets(&content, start_offset);
        self.next_offset = start_offset + content.len() as u32 + 1;
        self.files.push(FileEntry {
            filename,
            content,
            start_offset,
            line_offsets,
        });
        FileID(self.files.len() as u32)
    }

    fn entry(&self, fid: FileID) -> Option<&FileEntry> {
        if fid.0 == 0 {
            return None;
        }
        self.files.get(fid.0 as usize - 1)
    }

    pub fn get_buffer_data(&self, fid: FileID) -> &str {
        self.entry(fid).map(|f| f.content.as_str()).unwrap_or("")
    }

    pub fn get_filename(&self, fid: FileID) -> &str {
        self.entry(fid).map(|f| f.filename.as_str()).unwrap_or("")
    }

    /// Compose a [`SourceLocation`] from a file and a byte offset within it.
    pub fn get_location(&self, fid: FileID, offset_in_file: u32) -> SourceLocation {
        match self.entry(fid) {
            Some(f) if offset_in_file as usize <= f.content.len() => {
                SourceLocation::new(f.start_offset + offset_in_file)
            }
            _ => SourceLocation::INVALID,
        }
    }

    /// Linear scan over loaded files to find the one owning `loc`.
    pub fn get_file_id(&self, loc: SourceLocation) -> FileID {
        if loc.is_invalid() {
            return FileID::INVALID;
        }
        let offset = loc.offset();
        for (idx, f) in self.files.iter().enumerate() {
            if offset >= f.start_offset && offset <= f.end_offset() {
                return FileID(idx as u32 + 1);
            }
        }
        FileID::INVALID
    }

    /// 1-based `(line, column)` for `loc`, or `(0, 0)` if `loc` is invalid.
    pub fn get_line_and_column(&self, loc: SourceLocation) -> (u32, u32) {
        let fid = self.get_file_id(loc);
        let f = match self.entry(fid) {
            Some(f) => f,
            None => return (0, 0),
        };
        let offset = loc.offset();
        // Binary search for the last line-start offset <= offset.
        let line_index = match f.line_offsets.binary_search(&offset) {
            Ok(i) => i + 1, // offset is exactly a line start -> that line
            Err(i) => i,
        };
        let line = (line_index as u32) + 1;
        let line_start = if line_index == 0 {
            f.start_offset
        } else {
            f.line_offsets[line_index - 1]
        };
        let column = offset - line_start + 1;
        (line, column)
    }

    /// The text of the line containing `loc`, without its terminator.
    pub fn get_line_content(&self, loc: SourceLocation) -> String {
        let fid = self.get_file_id(loc);
        let f = match self.entry(fid) {
            Some(f) => f,
            None => return String::new(),
        };
        let (line, _) = self.get_line_and_column(loc);
        if line == 0 {
            return String::new();
        }
        let line_index = (line - 1) as usize;
        let local_start = if line_index == 0 {
            0
        } else {
            (f.line_offsets[line_index - 1] - f.start_offset) as usize
        };
        let local_end = if line_index < f.line_offsets.len() {
            (f.line_offsets[line_index] - f.start_offset) as usize
        } else {
            f.content.len()
        };
        let slice = f.content.get(local_start..local_end).unwrap_or("");
        slice.trim_end_matches(['\n', '\r']).to_string()
    }

    pub fn get_range_text(&self, range: SourceRange) -> String {
        if range.is_invalid() {
            return String::new();
        }
        let fid = self.get_file_id(range.begin());
        let f = match self.entry(fid) {
            Some(f) => f,
            None => return String::new(),
        };
        let start = (range.begin().offset() - f.start_offset) as usize;
        let end = (range.end().offset() - f.start_offset) as usize;
        f.content.get(start..end.max(start)).unwrap_or("").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_line_and_column() {
        let mut sm = SourceManager::new();
        let fid = sm.create_buffer("a.lum".into(), "let x = 1\nlet y = 2\n".into());
        let loc = sm.get_location(fid, 14); // inside "y" on line 2
        let (line, col) = sm.get_line_and_column(loc);
        assert_eq!(line, 2);
        assert_eq!(col, 5);
        assert_eq!(sm.get_line_content(loc), "let y = 2");
    }

    #[test]
    fn invalid_location_yields_zero_zero() {
        let sm = SourceManager::new();
        assert_eq!(sm.get_line_and_column(SourceLocation::INVALID), (0, 0));
    }

    #[test]
    fn handles_crlf_and_bare_cr() {
        let mut sm = SourceManager::new();
        let fid = sm.create_buffer("b.lum".into(), "a\r\nb\rc\n".into());
        let loc_b = sm.get_location(fid, 3); // 'b' after CRLF
        assert_eq!(sm.get_line_and_column(loc_b), (2, 1));
        let loc_c = sm.get_location(fid, 5); // 'c' after bare CR
        assert_eq!(sm.get_line_and_column(loc_c), (3, 1));
    }

    #[test]
    fn separate_files_do_not_overlap() {
        let mut sm = SourceManager::new();
        let f1 = sm.create_buffer("a.lum".into(), "x".into());
        let f2 = sm.create_buffer("b.lum".into(), "y".into());
        let loc1 = sm.get_location(f1, 0);
        let loc2 = sm.get_location(f2, 0);
        assert_eq!(sm.get_file_id(loc1), f1);
        assert_eq!(sm.get_file_id(loc2), f2);
        assert_ne!(loc1, loc2);
    }
}
