//! # phonomat - PWmat/VASP 声子前处理工具
//!
//! 把 PWmat 与 VASP 的输出整理成声子计算所需的输入，统一成单一可执行文件。
//!
//! ## 子命令
//! - `convert` - 结构格式转换 (atom.config -> POSCAR / atom.config)
//! - `forces`  - 读取一组受力文件并报告漂移力
//! - `fc`      - 从 vasprun.xml 或 OUTCAR 构造 FORCE_CONSTANTS
//! - `born`    - 从 vasprun.xml 或 OUTCAR 提取 BORN
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   └── commands/   (命令执行逻辑)
//!         └── phonomat (库：parsers / models / phonon / batch / utils)
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use phonomat::utils::output;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
