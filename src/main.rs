use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use vacancy_analytics_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    if config.scheduler_enabled {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create scheduler: {}", e))?;
        let ingest = app_state.ingest.clone();
        let job = Job::new_async(config.ingest_cron.as_str(), move |_uuid, _lock| {
            let ingest = ingest.clone();
            Box::pin(async move {
                info!("Scheduled ingestion pass starting");
                if let Err(e) = ingest.run_all().await {
                    tracing::error!(error = ?e, "Scheduled ingestion pass failed");
                }
            })
        })
        .map_err(|e| anyhow::anyhow!("Invalid ingest cron expression: {}", e))?;
        scheduler
            .add(job)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to schedule ingestion job: {}", e))?;
        scheduler
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start scheduler: {}", e))?;
        info!(cron = %config.ingest_cron, "Ingestion scheduler started");
    }

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/search-queries",
            get(routes::search_query::list_search_queries)
                .post(routes::search_query::create_search_query),
        )
        .route(
            "/api/search-queries/:id",
            get(routes::search_query::get_search_query)
                .patch(routes::search_query::update_search_query),
        )
        .route(
            "/api/ingest/run/:query_id",
            post(routes::ingest::run_search_query),
        )
        .route(
            "/api/analytics/:query_id/top-skills",
            get(routes::analytics::top_skills),
        )
        .route(
            "/api/analytics/:query_id/by-work-format",
            get(routes::analytics::by_work_format),
        )
        .route(
            "/api/analytics/:query_id/by-experience",
            get(routes::analytics::by_experience),
        )
        .route(
            "/api/analytics/:query_id/by-professional-role",
            get(routes::analytics::by_professional_role),
        )
        .route(
            "/api/analytics/:query_id/by-industry",
            get(routes::analytics::by_industry),
        )
        .route(
            "/api/analytics/:query_id/salaries",
            get(routes::analytics::average_salaries),
        )
        .route(
            "/api/analytics/:query_id/salary-experience-correlation",
            get(routes::analytics::salary_experience_correlation),
        )
        .route(
            "/api/analytics/:query_id/status-trends",
            get(routes::analytics::status_trends),
        )
        .route(
            "/api/analytics/:query_id/accreditation",
            get(routes::analytics::accreditation_split),
        )
        .route(
            "/api/analytics/:query_id/top-areas",
            get(routes::analytics::top_areas),
        )
        .route(
            "/api/analytics/:query_id/counts",
            get(routes::analytics::counts),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
