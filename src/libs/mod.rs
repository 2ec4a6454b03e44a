//! Core engine of the ledger.
//!
//! Leaf modules come first: [`clock`] and [`duration`] are pure helpers,
//! [`entry`] and [`project`] are the records, [`timer`], [`registry`] and
//! [`report`] are the components working on them, and [`ledger`] wires all
//! of it to a migrated store.

pub mod clock;
pub mod config;
pub mod data_storage;
pub mod duration;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod messages;
pub mod project;
pub mod registry;
pub mod report;
pub mod timer;
pub mod view;
