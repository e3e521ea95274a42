//! Armory Ledger - Inventory Ledger over Worksheet Grids
//!
//! Treats a spreadsheet as a sparse store of serial numbers:
//! - stock worksheets: one column per item type, one serial per cell
//! - group worksheets: one row per person, one column per intention type
//!
//! Every component borrows an explicit `LedgerStore` handle and the
//! `LedgerLayout`; nothing here holds global state. There are no
//! transactions: a composite operation that fails halfway stays half-applied.

pub mod aggregate;
pub mod assignment;
pub mod bootstrap;
pub mod locator;
pub mod mutator;
pub mod schema;

pub use aggregate::{
    render_summary, section_sheet_rows, Aggregate, AggregateSection, Aggregator, ItemCounts,
    SummaryRow,
};
pub use assignment::{
    AssignOutcome, AssignmentManager, Enrollment, ReturnAllOutcome, ReturnOutcome, ReturnedItem,
    SlotState,
};
pub use bootstrap::{bootstrap, BootstrapReport};
pub use locator::{find_person_in, find_serial_in, RecordLocator, SerialLocation};
pub use mutator::{AddOutcome, InsertOutcome, LedgerMutator, MoveOutcome, MoveRejection, RemoveOutcome};
pub use schema::{known_intention_types, ColumnRef, SchemaRegistry, SheetSync, SyncReport};
