//! # 批量执行器
//!
//! 并行执行批量处理任务。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，结果保持输入顺序
//! - 进度条显示
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/forces.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::Result;
use crate::utils::progress;

use rayon::prelude::*;
use std::path::PathBuf;

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 跳过（如文件已存在）
    Skipped(String),
    /// 处理失败
    Failed(String, String), // (文件路径, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 时使用全部核心
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表并汇总
    pub fn run<F>(&self, files: &[PathBuf], processor: F) -> BatchResult
    where
        F: Fn(&PathBuf) -> ProcessResult + Sync + Send,
    {
        let mut batch_result = BatchResult::default();
        for result in self.map(files, "Processing", processor) {
            batch_result.merge(result);
        }
        batch_result
    }

    /// 并行处理文件列表，返回值与输入一一对应且顺序一致
    pub fn map<T, F>(&self, files: &[PathBuf], message: &str, processor: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&PathBuf) -> T + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, message);

        let work = || -> Vec<T> {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    pb.inc(1);
                    result
                })
                .collect()
        };

        // 线程池创建失败时退回全局线程池
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(_) => work(),
        };

        pb.finish_and_clear();
        results
    }

    /// 并行解析，任一文件失败则整体失败（返回第一个出错文件的错误）
    pub fn try_map<T, F>(&self, files: &[PathBuf], message: &str, processor: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&PathBuf) -> Result<T> + Sync + Send,
    {
        self.map(files, message, processor).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhonomatError;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("file-{:03}", i))).collect()
    }

    #[test]
    fn test_map_preserves_order() {
        let files = paths(64);
        let runner = BatchRunner::new(4);
        let names = runner.map(&files, "Testing", |p| p.display().to_string());
        let expected: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_run_counts_results() {
        let files = paths(5);
        let runner = BatchRunner::new(2);
        let result = runner.run(&files, |p| {
            let name = p.display().to_string();
            match name.as_str() {
                "file-001" => ProcessResult::Skipped(name),
                "file-003" => ProcessResult::Failed(name, "bad".to_string()),
                _ => ProcessResult::Success(name),
            }
        });

        assert_eq!(result.total(), 5);
        assert_eq!(result.success, 3);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failures, vec![("file-003".to_string(), "bad".to_string())]);
    }

    #[test]
    fn test_try_map_fails_on_first_error() {
        let files = paths(4);
        let runner = BatchRunner::new(0);
        let result = runner.try_map(&files, "Testing", |p| {
            if p.ends_with("file-002") {
                Err(PhonomatError::InvalidArgument(p.display().to_string()))
            } else {
                Ok(1)
            }
        });
        assert!(matches!(result, Err(PhonomatError::InvalidArgument(s)) if s == "file-002"));
        assert!(runner.jobs() >= 1);
    }
}
