//! # 示例应用程序
//!
//! 演示声明式依赖解析：能力依赖、显式命名依赖、自动注册和构造函数。

use anyhow::Context;
use clap::Parser;
use component_macros::Component;
use di_abstractions::{ComponentRegistry, ComponentResolver, ContainerBuilder, Dep, DiContainer};
use di_common::ContainerConfig;
use di_impl::DiContainerBuilder;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "di-demo")]
#[command(about = "Lorn DI 示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/container.toml")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 打印组件元数据
    #[arg(long)]
    metadata: bool,
}

/// 时钟能力
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// 固定时钟
#[derive(Debug, Default, Component)]
#[component(constructor, provides(dyn Clock))]
struct FixedClock {
    epoch: u64,
}

impl FixedClock {
    fn constructor(&self) -> Self {
        Self { epoch: 1_700_000_000 }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.epoch
    }
}

/// 报表设置
#[derive(Debug, Default, Component)]
#[component(name = "report-settings")]
struct ReportSettings {
    title: String,
    limit: usize,
}

/// 访问计数器，未显式注册，由容器自动注册零值组件
#[derive(Debug, Default, Component)]
struct VisitCounter {
    visits: u64,
}

/// 报表服务
#[derive(Debug, Default, Component)]
#[component(constructor = "prepare")]
struct ReportService {
    #[dep]
    clock: Dep<dyn Clock>,
    #[dep = "report-settings"]
    settings: Dep<ReportSettings>,
    #[dep]
    counter: Dep<VisitCounter>,
    header: String,
}

impl ReportService {
    fn prepare(&self) -> Result<Self, String> {
        if self.settings.limit == 0 {
            return Err("报表条数上限必须大于 0".to_string());
        }
        Ok(Self {
            clock: self.clock.clone(),
            settings: self.settings.clone(),
            counter: self.counter.clone(),
            header: format!("{} @ {}", self.settings.title, self.clock.now()),
        })
    }

    fn render(&self) -> String {
        format!(
            "{} (上限 {} 条, 已访问 {} 次)",
            self.header, self.settings.limit, self.counter.visits
        )
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("启动 Lorn DI 示例应用");

    let config = ContainerConfig::load(&args.config)
        .with_context(|| format!("加载容器配置失败: {}", args.config))?;
    info!("容器配置: {:?}", config);

    let mut container = DiContainerBuilder::new()
        .with_config(config)
        .register(ReportService::default())
        .register_as(
            "report-settings",
            ReportSettings {
                title: "每日报表".to_string(),
                limit: 20,
            },
        )
        .register(FixedClock::default())
        .build()
        .context("构建容器失败")?;

    if let Err(errors) = container.validate() {
        for error in &errors {
            warn!("依赖图问题: {}", error);
        }
        anyhow::bail!("依赖图校验失败: {} 个问题", errors.len());
    }

    container.resolve_all().context("解析组件失败")?;

    let service = container
        .get::<ReportService>()?
        .context("报表服务未注册")?;
    info!("{}", service.render());

    if args.metadata {
        let metadata = serde_json::to_string_pretty(&container.registered_components())?;
        println!("{metadata}");
    }

    let stats = container.stats();
    info!(
        "容器 {} 统计: 注册 {} 个, 已解析 {} 个, 自动注册 {} 个",
        container.id(),
        stats.registered_components,
        stats.resolved_components,
        stats.auto_registered_components
    );

    Ok(())
}
