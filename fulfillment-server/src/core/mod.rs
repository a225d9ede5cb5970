//! 核心运行时组件

pub mod tasks;

pub use tasks::{FinalizeQueue, JobStatus, panic_message};
