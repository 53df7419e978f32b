//! # 批量处理模块
//!
//! 多个结构文件或受力文件的收集与并行处理。
//!
//! ## 功能
//! - 单文件或目录输入，按模式收集并排序
//! - 并行处理，结果保持输入顺序
//! - 进度反馈与成功/跳过/失败统计
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/forces.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
