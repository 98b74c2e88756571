//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryTaskStore**: セッション内だけのタスクストア

pub mod inmem_store;

pub use self::inmem_store::InMemoryTaskStore;
