//! GRANTA Server — Application entry point.

use granta_db::repository::{
    SurrealGrantRepository, SurrealHierarchyNodeRepository, SurrealNotificationRepository,
    SurrealPermissionRepository, SurrealUserRepository,
};
use granta_db::{DbConfig, DbManager};
use granta_notify::{
    FanoutDispatcher, GrantService, NotificationService, NotifyConfig, PushRegistry,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("granta=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting GRANTA server...");

    let db_config = DbConfig::from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = granta_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let db = manager.client().clone();
    let node_repo = SurrealHierarchyNodeRepository::new(db.clone());
    let user_repo = SurrealUserRepository::new(db.clone());
    let permission_repo = SurrealPermissionRepository::new(db.clone());
    let grant_repo = SurrealGrantRepository::new(db.clone());
    let notification_repo = SurrealNotificationRepository::new(db);

    let push = PushRegistry::new(NotifyConfig::default());
    let dispatcher = FanoutDispatcher::new(
        user_repo,
        node_repo,
        notification_repo.clone(),
        push.clone(),
    );
    let _grants = GrantService::new(grant_repo, permission_repo, dispatcher.clone());
    let _notifications = NotificationService::new(notification_repo, dispatcher);

    tracing::info!("GRANTA server ready");

    // TODO: Mount the REST surface over the grant/notification services
    // TODO: Mount the WebSocket endpoint feeding PushRegistry::connect

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("GRANTA server stopped.");
}
