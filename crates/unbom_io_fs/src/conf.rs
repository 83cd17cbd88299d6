//! Engine constants.

/// UTF-8 byte-order-mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
/// Byte length of [`UTF8_BOM`].
pub const N_LEN_BOM: usize = UTF8_BOM.len();

/// Chunk size used by the shift and copy loops.
pub const N_SIZE_CHUNK: usize = 4096;

/// Smallest buffer the pool hands out.
pub const N_SIZE_POOL_BUFFER_MIN: usize = 16;
/// Upper bound on idle buffers kept by one pool.
pub const N_POOL_BUFFERS_RETAINED_MAX: usize = 64;

/// Skip reason for zero-length files.
pub const C_REASON_FILE_EMPTY: &str = "File is empty";
/// Skip reason for files without a UTF-8 BOM.
pub const C_REASON_BOM_NOT_FOUND: &str = "UTF-8 BOM not found";
/// Outcome message attached to dry-run hits.
pub const C_MESSAGE_DRY_RUN: &str = "dry run";

/// Timestamp layout appended to colliding copy targets.
pub const C_FMT_TIMESTAMP_SUFFIX: &str = "%Y%m%d%H%M%S%3f";
