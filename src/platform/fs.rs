// ElwSleuth - platform/fs.rs
//
// Journal file reading. One attempt per file: a failed read is terminal for
// the run, so there is no retry loop here.

use std::io;
use std::path::Path;

/// Read a journal as text.
///
/// Files at or above `large_threshold` bytes are memory-mapped instead of
/// copied into a read buffer. Invalid UTF-8 is replaced rather than
/// rejected; the JSON parser reports any line it damages.
pub fn read_journal(path: &Path, large_threshold: u64) -> io::Result<String> {
    let size = std::fs::metadata(path)?.len();
    if size >= large_threshold && size > 0 {
        tracing::debug!(
            file = %path.display(),
            size_mb = size / (1024 * 1024),
            "Memory-mapping large journal"
        );
        read_mapped(path)
    } else {
        read_file_lossy(path)
    }
}

/// Read the full content of a file as a string, lossily.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_mapped(path: &Path) -> io::Result<String> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the map is read-only and dropped before returning. A journal
    // being appended to by the game while mapped may yield a torn final
    // line, which the parser then reports like any other malformed line.
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}
