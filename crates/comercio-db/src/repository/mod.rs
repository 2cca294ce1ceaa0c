//! # Repository Implementations
//!
//! Each repository owns the SQL for one aggregate:
//!
//! - [`product`] - catalog rows + the inventory ledger (stock deltas)
//! - [`client`] - client directory + the debt balance aggregate (reads)
//! - [`supplier`] - supplier directory
//! - [`sale`] - the sale unit of work (header, lines, stock, receivable)
//! - [`receivable`] - the FIFO payment allocator + audit reads
//! - [`payable`] - the direct payment allocator + audit reads
//!
//! Mutating operations open their own transaction; ownership is exclusive:
//! only the sale unit of work creates receivables and raises debt, only the
//! receivable allocator reduces receivables and lowers debt, only the
//! payable allocator touches a payable row.

pub mod client;
pub mod payable;
pub mod product;
pub mod receivable;
pub mod sale;
pub mod supplier;
