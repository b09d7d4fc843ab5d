// ==========================================
// 运营计划对账系统 - 命令行入口
// ==========================================
// 用法:
//   operation-planning <config.json|-> <template> <forecast> <order> <shipment> <mapping> <out.csv>
//
// 配置传 "-" 时使用默认配置
// 主表写入 out.csv，异常清单写入 out_flags.csv，诊断 JSON 输出到 stdout
// ==========================================

use anyhow::{bail, Context};
use operation_planning::config::{ConfigManager, RunConfig};
use operation_planning::engine::ReconcileOrchestrator;
use operation_planning::importer::{FileTableSource, RunPaths};
use operation_planning::render::{CsvRenderer, TableRenderer};
use operation_planning::{logging, APP_NAME, VERSION};
use std::path::PathBuf;

const USAGE: &str =
    "用法: operation-planning <config.json|-> <template> <forecast> <order> <shipment> <mapping> <out.csv>";

fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 7 {
        bail!("参数个数错误（期望 7 个，实际 {} 个）\n{}", args.len(), USAGE);
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", APP_NAME, VERSION);
    tracing::info!("==================================================");

    // 配置
    let manager = match args[0].as_str() {
        "-" => ConfigManager::default(),
        path => ConfigManager::from_file(path).with_context(|| format!("读取配置失败: {}", path))?,
    };
    let config = RunConfig::from_reader(&manager)?;
    tracing::debug!(snapshot = %manager.get_config_snapshot()?, "配置快照");

    let paths = RunPaths {
        template: PathBuf::from(&args[1]),
        forecast: PathBuf::from(&args[2]),
        order: PathBuf::from(&args[3]),
        shipment: PathBuf::from(&args[4]),
        mapping: Some(PathBuf::from(&args[5])),
    };
    let output_path = PathBuf::from(&args[6]);

    // 对账
    let orchestrator = ReconcileOrchestrator::new(config);
    let source = FileTableSource::new(paths, orchestrator.config());
    let output = orchestrator.run_from_source(&source)?;

    // 输出
    let mut renderer = CsvRenderer::to_paths(&output_path)
        .with_context(|| format!("无法创建输出文件: {}", output_path.display()))?;
    renderer.render(&output.table, &output.flagged)?;

    println!("{}", serde_json::to_string_pretty(&output.diagnostics)?);
    Ok(())
}
