pub mod partition_adapter;

pub use partition_adapter::{Cascade, PartitionAdapter, Reference, UniqueKey};
