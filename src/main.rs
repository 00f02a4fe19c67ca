use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use recruitment_intake::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let api = Router::new()
        .route("/api/addApplication", post(routes::applications::create_application))
        .route("/api/getApplications", get(routes::applications::list_applications))
        .route("/api/get/count", get(routes::applications::get_application_counts))
        .route("/api/sendemail", post(routes::applications::send_status_email))
        .route("/api/applications/:id", get(routes::applications::get_application))
        .route("/api/remove-duplicates", delete(routes::applications::remove_duplicates))
        .route("/api/export/excel", get(routes::export::export_applications_excel))
        .route(
            "/api/export/excel/selected",
            get(routes::export::export_selected_excel),
        );

    info!("Serving uploads from: {}", config.uploads_dir);

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(&config.uploads_dir),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
