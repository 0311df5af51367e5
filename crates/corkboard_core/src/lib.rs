//! Corkboard core
//!
//! Domain model and persistence for a realtime drag-and-drop board:
//!
//! - **Position model**: plain integer positions, ascending sort, gaps
//!   permitted, deterministic tie-break on `(created_at, id)`.
//! - **Store**: [`BoardRepo`], a SQLite-backed repository of containers and
//!   their items, with race-free end-of-scope position assignment.
//! - **Reorder transaction engine**: [`reorder::validate_batch`] plus
//!   [`BoardRepo::apply_reorder`], which applies a whole batch of
//!   position/container changes as a single all-or-nothing transaction.
//! - **Snapshot reader**: [`BoardRepo::snapshot`], the consistently-read,
//!   fully-sorted board state that gets broadcast to clients.

pub mod db;
pub mod error;
pub mod id;
pub mod model;
pub mod reorder;

pub use db::{BoardRepo, init_database};
pub use error::{BoardError, Result};
pub use model::{Container, ContainerWithItems, Item, Snapshot};
pub use reorder::{ReorderBatch, ReorderContainer, ReorderItem, validate_batch};
