//! `unbom_io_fs` v1:
//! Rust-side UTF-8 BOM removal engine.
//!
//! - `bom`      : BOM detection, in-place shift, stripped copy
//! - `conf`     : constants
//! - `open`     : exclusive file opening with classified failures
//! - `pool`     : reusable IO buffers
//! - `report`   : per-file outcomes, run summary, serialized console
//! - `spec`     : enums/options/errors and the per-stage result type
//! - `strategy` : overwrite vs copy pipelines
//! - `strip`    : validation and parallel orchestration
//! - `walk`     : file-set enumeration
//! - `util`     : shared helper functions

pub mod bom;
pub mod conf;
pub mod open;
pub mod pool;
pub mod report;
pub mod spec;
mod strategy;
pub mod strip;
mod util;
pub mod walk;

pub use bom::{check_for_bom, copy_remaining_bytes, has_bom, shift_in_place};
pub use open::{OpenStreamError, open_stream};
pub use pool::{BufferPool, PooledBuffer};
pub use report::{OutputConsole, ReportStrip, ReportStripBuilder, SpecStripError, SpecStripOutcome};
pub use spec::{
    EnumFileOpResult, EnumOutputMode, EnumPatternMode, EnumStripStatus, SpecStripOptions,
    StripError,
};
pub use strip::{strip_files, strip_tree, validate_options};
pub use walk::{SpecFileSet, collect_files};
