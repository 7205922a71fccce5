//! Accepting connections and handing them to workers.

pub mod listener;
