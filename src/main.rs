//! # crysaudit - 晶体结构预测的化学规则审计工具
//!
//! 对机器生成的晶体结构预测做计算前的化学合理性审计：
//! 电荷平衡、离子半径几何、静电价规则、键价和、空间群合理性。
//! 每项检验输出连续信号，从不给出最终判定。
//!
//! ## 子命令
//! - `ingest`   - 摄入材料元数据 CSV 与空间群统计
//! - `validate` - 对单个材料或整个集合执行检验（断点续跑）
//! - `summary`  - 逐检验聚合统计表
//! - `show`     - 查看单个材料的赋值与检验结果
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/         (命令行参数定义)
//!   ├── commands/    (命令执行逻辑)
//!   ├── pipeline.rs  (审计管线编排)
//!   ├── validators/  (六项规则校验器)
//!   ├── oxi/         (氧化态共识引擎)
//!   ├── chem/        (元素数据与经验参数表)
//!   ├── neighbors.rs (配位环境缓存)
//!   ├── models/      (材料与结构数据模型)
//!   ├── parsers/     (.res 结构解析)
//!   ├── db/          (SQLite 持久化)
//!   ├── utils/       (输出与进度工具)
//!   ├── config.rs    (阈值配置)
//!   └── error.rs     (错误处理)
//! ```

mod chem;
mod cli;
mod commands;
mod config;
mod db;
mod error;
mod models;
mod neighbors;
mod oxi;
mod parsers;
mod pipeline;
mod utils;
mod validators;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
