use anyhow::Context;
use booking_engine::layout::LayoutSaveWorker;
use booking_engine::{BookingSession, EngineConfig, RedbStore, SessionPersistence, init_logger_with_file};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境变量 + 日志
    dotenv::dotenv().ok();
    let config = EngineConfig::from_env();
    init_logger_with_file(Some(&config.log_level), None, config.log_dir.as_deref());

    tracing::info!(work_dir = %config.work_dir, "Booking engine starting...");

    // 2. 打开存储
    std::fs::create_dir_all(&config.work_dir)
        .with_context(|| format!("Failed to create work dir {}", config.work_dir))?;
    let store_path = config.store_path();
    let store = Arc::new(
        RedbStore::open(&store_path)
            .with_context(|| format!("Failed to open store {}", store_path.display()))?,
    );

    // 3. 布局保存后台任务
    // 进程退出时 sink 全部释放即停止, 无需单独取消
    let (worker, sink) =
        LayoutSaveWorker::new(SessionPersistence::new(store.clone()), CancellationToken::new());
    let worker_handle = tokio::spawn(worker.run());

    // 4. 恢复会话并输出
    let session = BookingSession::open(config, store, Box::new(sink))?;
    let summary = serde_json::json!({
        "flow": session.flow(),
        "people": session.people_summaries(),
        "cart": session.cart_view(),
        "tables": session.layout().sorted(),
        "orderHistory": session.history().entries(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    // 5. 关闭: 写回, 释放 sink 后等待后台任务写完
    session.flush();
    drop(session);
    worker_handle.await.context("Layout save worker panicked")?;

    tracing::info!("Booking engine stopped");
    Ok(())
}
