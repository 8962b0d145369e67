use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use portal_cleaner::utils::logging;
use portal_cleaner::{App, CancelFlag, Config, Progress, RunInputs};

/// 工单收尾自动化
#[derive(Debug, Parser)]
#[command(name = "portal_cleaner", version)]
struct Args {
    /// 开始日期 (dd.mm.yyyy)，留空表示不限
    #[arg(long, value_name = "DATE")]
    start_date: Option<String>,

    /// 结束日期 (dd.mm.yyyy)，留空表示不限
    #[arg(long, value_name = "DATE")]
    end_date: Option<String>,

    /// 只处理该状态的工单（大小写不敏感）
    #[arg(long)]
    status: Option<String>,

    /// 产品代码文件 (.txt / .xlsx / .xls / .xml)；不指定时处理当前页面所有工单
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    codes: Option<Option<PathBuf>>,

    /// 配置文件 (TOML)
    #[arg(long, value_name = "FILE", env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// 无头模式运行浏览器
    #[arg(long)]
    headless: bool,

    /// 详细日志
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn run_inputs(&self) -> RunInputs {
        let date_range = if self.start_date.is_some() || self.end_date.is_some() {
            Some((
                self.start_date.clone().unwrap_or_default(),
                self.end_date.clone().unwrap_or_default(),
            ))
        } else {
            None
        };
        RunInputs {
            date_range,
            status: self.status.clone(),
            code_file: self.codes.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let mut config = Config::load(args.config.as_deref())?;
    config.browser.headless |= args.headless;
    config.verbose_logging |= args.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 运行前校验，任何错误都不会启动浏览器
    let options = args
        .run_inputs()
        .into_options()
        .await
        .context("运行参数无效")?;

    let progress = Progress::tracing_only();
    let cancel = CancelFlag::new();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⏹ 收到中断信号，当前项目完成后停止");
                cancel.cancel();
            }
        }
    });

    let app = App::new(config, progress, cancel);
    // 自动化在独立任务中运行，主任务保持对中断信号的响应
    tokio::spawn(async move { app.run(&options).await }).await??;

    Ok(())
}
