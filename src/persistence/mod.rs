//! # Persistence Boundary
//!
//! The generator never stores anything itself. Callers hand its results to a
//! [`RecordStore`], usually through [`CourseMerger`].
//!
//! Every operation is scoped to an [`OwnerId`]; there is no way to read or
//! write across owners through this interface. [`MemoryRecordStore`] is the
//! bundled implementation, used by tests and the CLI.

mod merge;
mod model;
mod store;

pub use merge::{research_note, CourseMerger, Merged, RESEARCH_TAG};
pub use model::{Course, Note, OwnerId, Record, MANAGED_FIELDS};
pub use store::{apply_patch, MemoryRecordStore, RecordStore};
