// ==========================================
// 仓储货位规划引擎 - 命令行入口
// ==========================================
// 用法: warehouse-slotting <audit|macro|micro|run> --catalog <文件> [--orders <文件>]
//       [--config <json>] [--out-dir <目录>] [--json]
// 输出: 结果写 stdout；日志写 stderr
// ==========================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use warehouse_slotting::api::{self, SlottingApi, Table};
use warehouse_slotting::config::{ConfigManager, CONFIG_ENV_VAR};
use warehouse_slotting::domain::{AuditResult, MacroResult, MicroResult};
use warehouse_slotting::engine::SlottingRun;
use warehouse_slotting::logging;

#[derive(Parser)]
#[command(
    name = "warehouse-slotting",
    about = "仓储货位规划引擎 - 异常审计 / ABC 宏观分区 / VLM 托盘微观布局",
    version,
    propagate_version = true
)]
struct Cli {
    /// 配置文件（JSON）；缺省时依次尝试环境变量与用户配置目录
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// CSV 结果输出目录
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// 以 JSON 输出结果
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// 日志以 JSON 行格式输出
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// 目录文件（.xlsx / .xls / .ods / .csv）
    #[arg(long)]
    catalog: PathBuf,

    /// 订单文件（缺省时从目录工作簿的订单工作表读取）
    #[arg(long)]
    orders: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// 异常审计（超重 / 超体积 / 大单 / 高频）
    Audit(InputArgs),

    /// ABC 分类 + 宏观分区
    Macro(InputArgs),

    /// 宏观分区后对 VLM SKU 进行托盘装盘
    Micro(InputArgs),

    /// 完整流程
    Run(InputArgs),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let manager = ConfigManager::load(cli.config.as_deref()).context("加载配置失败")?;
    tracing::info!(
        version = warehouse_slotting::VERSION,
        config = ?manager.source(),
        "{} 启动",
        warehouse_slotting::APP_NAME
    );
    let slotting = SlottingApi::from_manager(&manager)?;

    let input = match &cli.command {
        Commands::Audit(input) | Commands::Macro(input) | Commands::Micro(input) | Commands::Run(input) => input,
    };
    let dataset = slotting.import(&input.catalog, input.orders.as_deref())?;
    if dataset.dq_report.has_errors() || dataset.dq_report.warning_rows > 0 {
        eprintln!(
            "数据质量: 阻断 {} 行, 警告 {} 行",
            dataset.dq_report.blocked_rows, dataset.dq_report.warning_rows
        );
    }

    match cli.command {
        Commands::Audit(_) => {
            let audit = slotting.audit(&dataset.skus, &dataset.order_lines)?;
            write_tables(cli.out_dir.as_deref(), &[("audit.csv", api::audit_table(&audit))])?;
            emit(&audit, cli.json, || print_audit(&audit))
        }
        Commands::Macro(_) => {
            let result = slotting.allocate(&dataset.skus, &dataset.order_lines)?;
            write_tables(
                cli.out_dir.as_deref(),
                &[
                    ("allocations.csv", api::allocation_table(&result)),
                    ("assignments.csv", api::assignment_table(&result.skus)),
                ],
            )?;
            emit(&result, cli.json, || print_macro(&result))
        }
        Commands::Micro(_) => {
            let macro_result = slotting.allocate(&dataset.skus, &dataset.order_lines)?;
            let result = slotting.pack(&macro_result, &dataset.order_lines)?;
            write_tables(cli.out_dir.as_deref(), &[("trays.csv", api::tray_table(&result))])?;
            emit(&result, cli.json, || print_micro(&result))
        }
        Commands::Run(_) => {
            let run = slotting.run(&dataset.skus, &dataset.order_lines)?;
            if let Some(dir) = cli.out_dir.as_deref() {
                api::write_run(&run, dir)?;
            }
            emit(&run, cli.json, || print_run(&run))
        }
    }
}

fn write_tables(out_dir: Option<&Path>, tables: &[(&str, Table)]) -> Result<()> {
    let Some(dir) = out_dir else {
        return Ok(());
    };
    std::fs::create_dir_all(dir).with_context(|| format!("无法创建输出目录 {}", dir.display()))?;
    for (file_name, table) in tables {
        table.write_csv_file(&dir.join(file_name))?;
    }
    Ok(())
}

fn emit<T: Serialize>(value: &T, json: bool, human: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}

// ==========================================
// 文本输出
// ==========================================

fn print_audit(audit: &AuditResult) {
    println!("SKU 总数: {}  订单总数: {}", audit.total_skus, audit.total_orders);
    println!("  超重 SKU:   {}", audit.heavy_skus.len());
    println!("  超体积 SKU: {}", audit.bulky_skus.len());
    println!("  B2B 大单:   {}", audit.massive_orders.len());
    println!("  高频 SKU:   {}", audit.ubiquitous_skus.len());
}

fn print_macro(result: &MacroResult) {
    println!("{:<16} {:>8} {:>12} {:>12} {:>8}", "存储类型", "SKU", "已用体积", "目标体积", "填充%");
    for a in &result.allocations {
        println!(
            "{:<16} {:>8} {:>12.3} {:>12.3} {:>8.1}",
            a.storage_id, a.skus_count, a.volume_used, a.volume_target, a.fill_percentage
        );
    }
    println!("溢出 SKU: {}  排除 SKU: {}", result.unassigned_count, result.excluded_ids.len());
    if result.has_warnings() {
        println!("警告: 存在溢出 SKU 或超出目标容量的存储类型");
    }
}

fn print_micro(result: &MicroResult) {
    for (vlm_id, trays) in result.trays_per_vlm.iter().enumerate() {
        println!("VLM {}: {} 托盘", vlm_id, trays.len());
    }
    println!(
        "亲和组: {}  高度效率: {:.1}%  面积效率: {:.1}%  单均托盘: {:.2}  复制覆盖: {:.1}%",
        result.group_count,
        result.height_efficiency,
        result.area_efficiency,
        result.avg_trays_per_order,
        result.replication_coverage
    );
    if !result.unplaced_skus.is_empty() {
        println!("未放置 SKU: {}", result.unplaced_skus.len());
    }
    if !result.overloaded_vlms.is_empty() {
        println!("超载 VLM: {:?}", result.overloaded_vlms);
    }
}

fn print_run(run: &SlottingRun) {
    print_audit(&run.audit);
    println!();
    print_macro(&run.macro_result);
    println!();
    print_micro(&run.micro_result);
}
