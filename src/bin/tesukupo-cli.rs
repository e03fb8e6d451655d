//! Tesukupo CLI 客户端
//!
//! 用命令行完成客户端（预约 / 历史 / 确认）与骑手端（接单 / 取件码 / 物品录入）的全部操作。
//! 会话保存在本地 SQLite，取件数据保存在远端 mock 存储。

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tesukupo_sdk_core::pickup::order::lifecycle::NextAction;
use tesukupo_sdk_core::{
    AdvanceOutcome, AppKind, ClientConfig, CustomerClient, InitialRoute, PartnerClient, Pickup,
    PickupApi, PickupFilter, PickupItem, PickupListener, ScheduleRequest, Session,
    SessionManager, StatusFilter,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AppArg {
    Customer,
    Partner,
}

impl From<AppArg> for AppKind {
    fn from(app: AppArg) -> Self {
        match app {
            AppArg::Customer => AppKind::Customer,
            AppArg::Partner => AppKind::Partner,
        }
    }
}

/// Tesukupo 上门取件 CLI
#[derive(Parser, Debug)]
#[command(name = "tesukupo-cli")]
#[command(about = "Tesukupo 上门取件 CLI - 客户端与骑手端", long_about = None)]
struct Args {
    /// 客户端类型（决定本地会话库）
    #[arg(long, value_enum, default_value = "customer", global = true)]
    app: AppArg,

    /// mock REST 存储地址（不含 /pickups）
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// 本地会话数据库 URL
    #[arg(long, global = true)]
    db: Option<String>,

    /// 新建取件时分配的骑手手机号
    #[arg(long, global = true)]
    partner_phone: Option<String>,

    /// HTTP 请求超时（秒），不设置则使用默认值
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// 日志级别（默认: warn,tesukupo_sdk_core=info）
    #[arg(long, default_value = "warn,tesukupo_sdk_core=info", global = true)]
    log_level: String,

    /// 日志文件
    #[arg(long, default_value = "tesukupo.log", global = true)]
    log_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 登录（姓名 + 10 位手机号 + 6 位 OTP）
    Login {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// 不提供时从标准输入读取
        #[arg(long)]
        otp: Option<String>,
    },
    /// 退出登录
    Logout,
    /// 查看当前会话与初始页面
    Whoami,
    /// [客户] 预约取件
    Schedule {
        /// 取件日期（YYYY-MM-DD）
        #[arg(long)]
        date: NaiveDate,
        /// 时间段，例如 "10–11 AM"
        #[arg(long)]
        slot: String,
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "")]
        map_link: String,
    },
    /// [客户] 最近的取件
    Dashboard,
    /// [客户] 订单历史
    History {
        /// All / Pending / Accepted / In-Process / Pending for Approval / Completed
        #[arg(long, default_value = "All")]
        status: StatusFilter,
        /// 按地址搜索
        #[arg(long, default_value = "")]
        search: String,
    },
    /// [客户] 确认完成
    Approve { id: String },
    /// [骑手] 分配给我的取件
    Assigned {
        #[arg(long, default_value = "All")]
        status: StatusFilter,
        /// 按客户姓名或地址搜索
        #[arg(long, default_value = "")]
        search: String,
    },
    /// [骑手] 最新分配的取件
    Latest,
    /// [骑手] 查看取件详情与下一步
    Show { id: String },
    /// [骑手] 推进状态（接单 / 提交客户确认）
    Advance { id: String },
    /// [骑手] 输入取件码并录入物品（Accepted → In-Process）
    Process {
        id: String,
        #[arg(long)]
        code: String,
        /// 物品，格式 名称:数量:价格，可重复
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str, log_file: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("无法创建日志文件 {}", log_file))?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(true);

    // 文件不需要颜色
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// 把提示直接打印给用户
#[derive(Default)]
struct CliPickupListener {
    error_shown: AtomicBool,
}

impl CliPickupListener {
    /// 是否已经以提示形式展示过失败信息
    fn error_shown(&self) -> bool {
        self.error_shown.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PickupListener for CliPickupListener {
    async fn on_pickup_list_changed(&self, pickups_json: String) {
        debug!("[CLI/Pickup] 列表刷新: {}", pickups_json);
    }

    async fn on_pickup_changed(&self, pickup_json: String) {
        debug!("[CLI/Pickup] 记录变更: {}", pickup_json);
    }

    async fn on_alert(&self, title: String, message: String) {
        if title != "Success" {
            self.error_shown.store(true, Ordering::SeqCst);
        }
        println!("[{}] {}", title, message);
    }
}

fn build_config(args: &Args) -> ClientConfig {
    let mut config = ClientConfig::new(args.app.into());
    if let Some(url) = &args.api_base_url {
        config.api_base_url = url.clone();
    }
    if let Some(db) = &args.db {
        config.db_url = db.clone();
    }
    if let Some(phone) = &args.partner_phone {
        config.partner_phone = phone.clone();
    }
    config.request_timeout = args.timeout_secs.map(Duration::from_secs);
    config
}

fn require_app(config: &ClientConfig, wanted: AppKind) -> Result<()> {
    if config.app != wanted {
        anyhow::bail!("该命令需要 --app {:?}", wanted);
    }
    Ok(())
}

fn parse_item(raw: &str) -> Result<PickupItem> {
    let mut parts = raw.rsplitn(3, ':');
    let price = parts.next().unwrap_or_default();
    let quantity = parts.next().unwrap_or_default();
    let name = parts.next().unwrap_or_default();
    if name.is_empty() && quantity.is_empty() {
        anyhow::bail!("物品格式应为 名称:数量:价格，实际为: {}", raw);
    }
    Ok(PickupItem::new(name, quantity, price))
}

async fn read_otp() -> Result<String> {
    println!("请输入 6 位 OTP:");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await
        .context("读取 OTP 失败")?
        .unwrap_or_default();
    Ok(line.trim().to_string())
}

fn print_pickup(pickup: &Pickup) {
    println!(
        "#{:<4} {:<22} {} {} | {}",
        pickup.id, pickup.status, pickup.pickup_date, pickup.time_slot, pickup.address
    );
}

fn print_pickup_detail(pickup: &Pickup) {
    println!("Pickup   #{}", pickup.id);
    println!("Customer {} ({})", pickup.user_name, pickup.user_phone);
    println!("Address  {}", pickup.address);
    if !pickup.map_link.is_empty() {
        println!("Map      {}", pickup.map_link);
    }
    println!("Date     {} {}", pickup.pickup_date, pickup.time_slot);
    println!("Status   {}", pickup.status);
    if !pickup.item_list.is_empty() {
        println!("Items    {}", pickup.item_list.join(", "));
        println!("Total    {}", pickup.total_amount);
    }
}

fn print_list(pickups: &[Pickup], empty_message: &str) {
    if pickups.is_empty() {
        println!("{}", empty_message);
    }
    for pickup in pickups {
        print_pickup(pickup);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logger(&args.log_level, &args.log_file) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let listener = Arc::new(CliPickupListener::default());
    match run(args, listener.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // 监听器已经打印过的失败不再重复输出
            if listener.error_shown() {
                debug!("[CLI] 命令失败: {:?}", e);
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, cli_listener: Arc<CliPickupListener>) -> Result<()> {
    let config = build_config(&args);
    info!(
        "[CLI] 🚀 app={:?}, api={}, db={}",
        config.app, config.api_base_url, config.db_url
    );

    let sessions = SessionManager::connect(&config.db_url, config.otp_code.clone()).await?;
    let store = Arc::new(PickupApi::from_base_url(
        config.api_base_url.clone(),
        config.request_timeout,
    )?);
    let listener: Arc<dyn PickupListener> = cli_listener;

    match args.command {
        Command::Login { name, phone, otp } => {
            let challenge = sessions.start_login(&name, &phone)?;
            let otp = match otp {
                Some(otp) => otp,
                None => read_otp().await?,
            };
            let session = sessions.complete_login(&challenge, &otp).await?;
            println!("OTP Verified! 欢迎 {} ({})", session.user_name, session.user_phone);
        }
        Command::Logout => {
            sessions.logout().await?;
            println!("已退出登录");
        }
        Command::Whoami => match sessions.initial_route().await {
            InitialRoute::Dashboard => {
                let session = sessions.current().await?;
                println!("{} ({}) → Dashboard", session.user_name, session.user_phone);
            }
            InitialRoute::GetStarted => println!("未登录 → GetStarted"),
        },
        command => {
            let session: Session = sessions.current().await?;
            match command {
                Command::Schedule {
                    date,
                    slot,
                    address,
                    map_link,
                } => {
                    require_app(&config, AppKind::Customer)?;
                    let client = CustomerClient::with_listener(
                        store,
                        session,
                        config.partner_phone.clone(),
                        listener,
                    );
                    let created = client
                        .schedule_pickup(ScheduleRequest {
                            pickup_date: date,
                            time_slot: slot,
                            address,
                            map_link,
                        })
                        .await?;
                    print_pickup(&created);
                    println!("取件码: {}（请在骑手上门时提供）", created.pickup_code);
                }
                Command::Dashboard => {
                    require_app(&config, AppKind::Customer)?;
                    let client = CustomerClient::with_listener(
                        store,
                        session,
                        config.partner_phone.clone(),
                        listener,
                    );
                    let recent = client.dashboard().await?;
                    print_list(&recent, "No pickups yet.");
                }
                Command::History { status, search } => {
                    require_app(&config, AppKind::Customer)?;
                    let client = CustomerClient::with_listener(
                        store,
                        session,
                        config.partner_phone.clone(),
                        listener,
                    );
                    let orders = client
                        .order_history(&PickupFilter::new(status, search))
                        .await?;
                    print_list(&orders, "No orders found.");
                }
                Command::Approve { id } => {
                    require_app(&config, AppKind::Customer)?;
                    let client = CustomerClient::with_listener(
                        store,
                        session,
                        config.partner_phone.clone(),
                        listener,
                    );
                    let done = client.approve(&id).await?;
                    print_pickup(&done);
                }
                Command::Assigned { status, search } => {
                    require_app(&config, AppKind::Partner)?;
                    let client = PartnerClient::with_listener(store, session, listener);
                    let assigned = client
                        .assigned_pickups(&PickupFilter::new(status, search))
                        .await?;
                    print_list(&assigned, "No assigned pickups.");
                }
                Command::Latest => {
                    require_app(&config, AppKind::Partner)?;
                    let client = PartnerClient::with_listener(store, session, listener);
                    let latest = client.latest_assigned().await?;
                    print_pickup_detail(&latest);
                }
                Command::Show { id } => {
                    require_app(&config, AppKind::Partner)?;
                    let client = PartnerClient::with_listener(store, session, listener);
                    let workflow = client.open_workflow(&id).await?;
                    print_pickup_detail(workflow.pickup());
                    let hint = match workflow.next_action() {
                        NextAction::Accept => "下一步: advance（接单）",
                        NextAction::EnterCode => "下一步: process（输入取件码并录入物品）",
                        NextAction::RequestApproval => "下一步: advance（提交客户确认）",
                        NextAction::AwaitCustomerApproval => "等待客户确认",
                        NextAction::Done => "已完成",
                    };
                    println!("{}", hint);
                }
                Command::Advance { id } => {
                    require_app(&config, AppKind::Partner)?;
                    let client = PartnerClient::with_listener(store, session, listener);
                    let mut workflow = client.open_workflow(&id).await?;
                    match workflow.advance().await? {
                        AdvanceOutcome::Updated(pickup) => {
                            print_pickup(&pickup);
                            if workflow.next_action() == NextAction::EnterCode {
                                println!("请向客户索取取件码后执行 process");
                            }
                        }
                        AdvanceOutcome::CodeRequired => {
                            println!("请向客户索取取件码后执行 process");
                        }
                    }
                }
                Command::Process { id, code, items } => {
                    require_app(&config, AppKind::Partner)?;
                    let items = items
                        .iter()
                        .map(|raw| parse_item(raw))
                        .collect::<Result<Vec<_>>>()?;
                    let client = PartnerClient::with_listener(store, session, listener);
                    let mut workflow = client.open_workflow(&id).await?;
                    if workflow.next_action() != NextAction::EnterCode {
                        warn!("[CLI] 取件 {} 当前状态为 {}", id, workflow.pickup().status);
                        anyhow::bail!("取件 {} 不在 Accepted 状态，无法录入物品", id);
                    }
                    workflow.advance().await?;
                    workflow.submit_code(&code).await?;
                    let updated = workflow.submit_items(items).await?;
                    print_pickup_detail(&updated);
                }
                // 会话命令已在上面处理
                Command::Login { .. } | Command::Logout | Command::Whoami => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_argument_splits_from_the_right() {
        let item = parse_item("Steel: scrap:3:120").unwrap();
        assert_eq!(item, PickupItem::new("Steel: scrap", "3", "120"));
        assert!(parse_item("Newspaper").is_err());
    }

    #[tokio::test]
    async fn only_failure_alerts_suppress_the_error_line() {
        let listener = CliPickupListener::default();
        listener
            .on_alert("Success".to_string(), "Pickup accepted.".to_string())
            .await;
        assert!(!listener.error_shown());
        listener
            .on_alert(
                "Invalid Code".to_string(),
                "The pickup code you entered is incorrect.".to_string(),
            )
            .await;
        assert!(listener.error_shown());
    }
}
