//! Shared data types for the coolwatch temperature notifier.

pub mod types;
