//! UTF-8 BOM detection and removal primitives.
//!
//! Each primitive takes ownership of the stream and hands it back inside
//! [`EnumFileOpResult::Continue`], so stages compose with
//! [`EnumFileOpResult::and_then`].

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::conf::{C_REASON_BOM_NOT_FOUND, C_REASON_FILE_EMPTY, N_LEN_BOM, N_SIZE_CHUNK, UTF8_BOM};
use crate::pool::BufferPool;
use crate::spec::EnumFileOpResult;

/// `true` when `buffer` starts with the 3-byte UTF-8 BOM.
pub fn has_bom(buffer: &[u8]) -> bool {
    buffer.len() >= N_LEN_BOM && buffer[..N_LEN_BOM] == UTF8_BOM
}

/// Read the first bytes of `stream` and decide whether it carries a BOM.
///
/// On `Continue` the stream position sits just past the BOM (offset 3).
pub fn check_for_bom<S: Read>(mut stream: S, pool: &BufferPool) -> EnumFileOpResult<S> {
    let mut buf = pool.acquire(N_LEN_BOM);
    let res_read = read_up_to(&mut stream, &mut buf[..N_LEN_BOM]);
    EnumFileOpResult::from_io(res_read).and_then(|n_read| {
        if n_read == 0 {
            return EnumFileOpResult::Skipped(C_REASON_FILE_EMPTY.to_string());
        }
        if !has_bom(&buf[..n_read]) {
            return EnumFileOpResult::Skipped(C_REASON_BOM_NOT_FOUND.to_string());
        }
        EnumFileOpResult::Continue(stream)
    })
}

/// Shift everything after the BOM to offset 0, then cut the last 3 bytes.
///
/// No scratch file is used. An IO error part-way leaves the file partially
/// shifted.
pub fn shift_in_place(mut file: File, pool: &BufferPool) -> EnumFileOpResult<File> {
    EnumFileOpResult::from_io(_shift_chunks(&mut file, pool)).map(|n_len_new| {
        debug!(n_len_new, "shifted content over BOM");
        file
    })
}

fn _shift_chunks(file: &mut File, pool: &BufferPool) -> io::Result<u64> {
    let n_len_file = file.metadata()?.len();
    let mut buf = pool.acquire(N_SIZE_CHUNK);
    let buf = &mut buf[..N_SIZE_CHUNK];

    let mut n_pos_read = N_LEN_BOM as u64;
    let mut n_pos_write = 0_u64;
    while n_pos_read < n_len_file {
        file.seek(SeekFrom::Start(n_pos_read))?;
        let n_read = read_up_to(file, buf)?;
        if n_read == 0 {
            break;
        }
        file.seek(SeekFrom::Start(n_pos_write))?;
        file.write_all(&buf[..n_read])?;
        n_pos_read += n_read as u64;
        n_pos_write += n_read as u64;
    }

    let n_len_new = n_len_file.saturating_sub(N_LEN_BOM as u64);
    file.set_len(n_len_new)?;
    file.flush()?;
    Ok(n_len_new)
}

/// Stream the rest of `stream` (already past the BOM) into a new file at
/// `path_target`.
///
/// The target is created with create-new semantics; an existing file makes
/// this stage fail. A failure mid-copy leaves the partial target in place.
pub fn copy_remaining_bytes<S: Read>(
    path_target: &Path,
    mut stream: S,
    pool: &BufferPool,
) -> EnumFileOpResult<S> {
    let res_copy = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path_target)
        .and_then(|mut file_dst| {
            let n_copied = _copy_chunks(&mut stream, &mut file_dst, pool)?;
            file_dst.flush()?;
            Ok(n_copied)
        });

    match res_copy {
        Ok(n_copied) => {
            debug!(n_copied, path_dst = %path_target.display(), "copied content after BOM");
            EnumFileOpResult::Continue(stream)
        }
        Err(e) => EnumFileOpResult::Failed(format!(
            "Failed to write {} ({e})",
            path_target.display()
        )),
    }
}

fn _copy_chunks<R: Read, W: Write>(src: &mut R, dst: &mut W, pool: &BufferPool) -> io::Result<u64> {
    let mut buf = pool.acquire(N_SIZE_CHUNK);
    let buf = &mut buf[..N_SIZE_CHUNK];
    let mut n_copied = 0_u64;
    loop {
        let n_read = read_up_to(src, buf)?;
        if n_read == 0 {
            return Ok(n_copied);
        }
        dst.write_all(&buf[..n_read])?;
        n_copied += n_read as u64;
    }
}

/// Fill `buf` from `src` until it is full or EOF. Returns bytes read.
pub(crate) fn read_up_to<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut n_filled = 0;
    while n_filled < buf.len() {
        match src.read(&mut buf[n_filled..]) {
            Ok(0) => break,
            Ok(n) => n_filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(n_filled)
}
