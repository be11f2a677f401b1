//! Field-level reconciliation of provider snapshots.
//!
//! - `priority` - the per-field provider order (PriorityTable)
//! - `reconciler` - applies the table to produce TokenDetails (FieldReconciler)

mod priority;
mod reconciler;

pub use priority::PriorityTable;
pub use reconciler::{FieldReconciler, Provenance};
