//! API Request and Response Types
//!
//! Request bodies keep the field names existing clients already send
//! (`serial_number`, `item_name`, `is_weapon`).

// Stock, assignment and repair requests
mod inventory;
pub use inventory::*;

// Operation results and summaries
mod report;
pub use report::*;
