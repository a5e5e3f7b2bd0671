use library_circulation::{
    adapters::{
        email::SmtpEmailService,
        memory::ItemCatalog as InMemoryItemCatalog,
        mock::EmailService as MockEmailService,
        postgres::{
            PostgresAdminRepository, PostgresFineRepository, PostgresLoanRepository,
            PostgresUserRepository,
        },
    },
    api::{handlers::AppState, router::create_router},
    application::{
        ServiceDependencies,
        notification::{EmailNotifier, NotificationService},
        users::{AdminSession, provision_admin},
    },
    config::AppConfig,
    domain::LibraryPolicy,
    ports::EmailService,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_circulation=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // E-mail: SMTP when configured, otherwise the recording mock
    let email_service: Arc<dyn EmailService> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "Using SMTP email service");
            Arc::new(SmtpEmailService::new(smtp).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be recorded in memory");
            Arc::new(MockEmailService::new())
        }
    };

    // Create service dependencies
    let service_deps = ServiceDependencies {
        loan_repository: Arc::new(PostgresLoanRepository::new(pool.clone())),
        fine_repository: Arc::new(PostgresFineRepository::new(pool.clone())),
        item_catalog: Arc::new(InMemoryItemCatalog::new()),
        user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
        admin_repository: Arc::new(PostgresAdminRepository::new(pool.clone())),
        email_service: email_service.clone(),
        policy: LibraryPolicy::default(),
    };

    if let Some(admin) = &config.admin {
        provision_admin(&service_deps, &admin.username, &admin.password)
            .await
            .expect("Failed to provision admin account");
    }

    // Overdue reminders go out by e-mail
    let notifier = match &config.notification_subject {
        Some(subject) => EmailNotifier::with_subject(email_service, subject.clone()),
        None => EmailNotifier::new(email_service),
    };
    let notifications = Arc::new(NotificationService::with_channel(
        service_deps.clone(),
        Arc::new(notifier),
    ));

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        notifications,
        admin_session: Arc::new(AdminSession::new()),
    });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
