//! # 美化输出工具
//!
//! 提供统一的终端输出样式。对称性破缺、旧版本报告过滤等提示都经由这里输出。
//! 警告与错误写到 stderr，stdout 只留给表格与张量。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块和 `main.rs` 使用
//! - 使用 `colored` crate

use crate::models::mat3::Mat3;
use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印带标签的 3x3 张量
pub fn print_tensor(label: &str, m: &Mat3) {
    println!("{} {}", "[*]".blue().bold(), label.bold());
    print!("{}", format_tensor(m));
}

fn format_tensor(m: &Mat3) -> String {
    m.iter()
        .map(|row| format!("    {:12.6} {:12.6} {:12.6}\n", row[0], row[1], row[2]))
        .collect()
}
