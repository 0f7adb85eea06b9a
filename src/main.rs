use certportal_backend::{account, certificate, config, upload};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), hyper::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,certportal_backend=debug")),
        )
        .init();

    let config = &*config::INSTANCE;
    info!(
        bind = %config.bind,
        domains = ?config.email_domains,
        "starting certificate portal v{}",
        env!("CARGO_PKG_VERSION")
    );

    account::INSTANCE.refresh_all();
    info!(
        accounts = account::INSTANCE.len(),
        certificates = certificate::INSTANCE.len(),
        uploads = upload::INSTANCE.len(),
        "stores loaded"
    );

    axum::Server::bind(&config.bind)
        .serve(certportal_backend::router().into_make_service())
        .await
}
