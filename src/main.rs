use std::sync::Arc;

use tokio::net::TcpListener;

use lobbywarden::config::Config;
use lobbywarden::host::HostClient;
use lobbywarden::monitor::MembershipMonitor;
use lobbywarden::routes;
use lobbywarden::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lobbywarden=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env();
    print_banner(&config);

    let db = lobbywarden::db::create_pool(&config.database_url)
        .await
        .expect("failed to open preference store");

    let mut host = HostClient::new(config.host_url.clone());
    if let Some(token) = config.host_token.clone() {
        host = host.with_auth_token(token);
    }
    let host: Arc<dyn lobbywarden::host::HostGateway> = Arc::new(host);

    let monitor = MembershipMonitor::new(db.clone(), host.clone(), config.monitor());

    let state = AppState {
        db,
        host,
        monitor,
        space_id: config.space_id.clone(),
    };

    let app = routes::router(state);
    let listener = TcpListener::bind(("127.0.0.1", config.port))
        .await
        .expect("failed to bind control port");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("server error");
}

fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");

    eprintln!();
    eprintln!("  \x1b[1;36mlobbywarden\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mport\x1b[0m       {}", config.port);
    eprintln!("  \x1b[2mdatabase\x1b[0m   {}", config.database_url);
    eprintln!("  \x1b[2mhost\x1b[0m       {}", config.host_url);
    eprintln!("  \x1b[2mspace\x1b[0m      {}", config.space_id);
    eprintln!(
        "  \x1b[2mpattern\x1b[0m    {}",
        config.channel_pattern.as_str()
    );
    eprintln!(
        "  \x1b[2mliveness\x1b[0m   {:?}  \x1b[2msampler\x1b[0m {:?}",
        config.liveness_window, config.sampler_interval
    );
    eprintln!();
}
