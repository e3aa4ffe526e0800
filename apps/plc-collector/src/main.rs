//! PLC 采集服务入口：装配存储、协议客户端、采集循环与控制 API。

mod bootstrap;
mod handlers;
mod middleware;
mod routes;
mod utils;


use axum::Router;
use plc_collection::CollectionService;
use plc_config::AppConfig;
use plc_protocol::{ModbusTcpClient, RegisterClient};
use plc_storage::{StoreSet, connect_pool, run_migrations};
use plc_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 控制 API 共享状态。
#[derive(Clone)]
pub struct AppState {
    pub collection: Arc<CollectionService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let pool = connect_pool(&config.database_url).await?;
    let applied = run_migrations(&pool).await?;
    info!(target: "plc.api", applied, database_url = %config.database_url, "migrations_applied");
    let stores = StoreSet::sqlite(pool);

    if let Some(path) = &config.devices_file {
        let seeded = bootstrap::seed_devices_from_file(&stores, path).await?;
        info!(target: "plc.api", path = %path, seeded, "devices_seeded");
    }

    let client = Arc::new(ModbusTcpClient::new(bootstrap::modbus_config(&config)));
    let service = Arc::new(CollectionService::new(
        client,
        stores,
        bootstrap::collection_config(&config),
    ));
    service.initialize().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let collection_task = service.spawn(shutdown_rx.clone());
    let purge_task = bootstrap::spawn_log_purge(Arc::clone(&service), shutdown_rx.clone());
    if config.autostart {
        service.start();
    }

    let app = build_router(AppState {
        collection: Arc::clone(&service),
    });
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "plc.api", addr = %config.http_addr, "http_listening");
    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.wait_for(|stop| *stop).await;
            })
            .await
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "plc.api", error = %err, "shutdown_signal_failed");
    }
    info!(target: "plc.api", "shutdown_requested");
    service.stop();
    let _ = shutdown_tx.send(true);

    // 等待进行中的周期完成，超过宽限时间则中止
    let grace = Duration::from_secs(config.shutdown_grace_seconds);
    let abort = collection_task.abort_handle();
    if tokio::time::timeout(grace, collection_task).await.is_err() {
        warn!(
            target: "plc.api",
            grace_seconds = config.shutdown_grace_seconds,
            "collection_shutdown_timeout"
        );
        abort.abort();
    }
    purge_task.abort();
    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Err(err))) => warn!(target: "plc.api", error = %err, "http_server_failed"),
        Ok(Err(err)) => warn!(target: "plc.api", error = %err, "http_task_failed"),
        Err(_) => warn!(target: "plc.api", "http_shutdown_timeout"),
        Ok(Ok(Ok(()))) => {}
    }
    service.client().disconnect().await;
    info!(target: "plc.api", "shutdown_complete");
    Ok(())
}

/// 组装路由并挂载请求上下文与 HTTP 追踪中间件。
pub fn build_router(state: AppState) -> Router {
    routes::create_api_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::request_context))
            .layer(TraceLayer::new_for_http()),
    )
}
