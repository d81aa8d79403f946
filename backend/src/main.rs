mod classifier;
mod config;
mod error;
mod report;
mod services;
mod session;
mod workflow;

use crate::config::Config;
use crate::session::SessionState;
use crate::workflow::state::{start_workflow_updater, WorkflowState};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();

    session::store::init_db(&config.db_path).map_err(std::io::Error::other)?;
    for dir in [&config.spool_dir, &config.assets_dir] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("could not create {}: {}", dir.display(), e);
        }
    }

    // A session persisted by a previous run keeps the clinician signed in.
    let sessions = SessionState::new();
    match session::store::load_session(&config.db_path) {
        Ok(Some(persisted)) => {
            info!("restoring persisted session for {}", persisted.email);
            sessions.restore(persisted).await;
        }
        Ok(None) => {}
        Err(e) => warn!("could not restore persisted session: {}", e),
    }

    // Initialize workflow state and its updater task.
    let strategy = classifier::strategy_from_config(config.strategy).map_err(std::io::Error::other)?;
    let (tx, rx) = mpsc::channel(100);
    let workflow_state = WorkflowState::new(tx);

    let updater_state = workflow_state.clone();
    tokio::spawn(async move {
        start_workflow_updater(updater_state, rx, strategy).await;
    });

    let bind_addr = (config.host.clone(), config.port);
    info!(
        "server running at http://{}:{} with the {:?} strategy",
        config.host, config.port, config.strategy
    );

    let assets_dir = config.assets_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(web::Data::new(workflow_state.clone()))
            .service(services::auth::configure_routes())
            .service(services::uploads::configure_routes())
            .service(services::analysis::configure_routes())
            .service(services::results::configure_routes())
            .service(actix_files::Files::new("/assets", assets_dir.clone()))
    })
    .bind(bind_addr)?
    .run()
    .await
}
