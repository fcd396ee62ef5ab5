use outpost::config::Config;
use outpost::http::mime::default_mime_lookup;
use outpost::router::Router;
use outpost::router::static_files::StaticFiles;
use outpost::server::listener::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut router = Router::new();
    if cfg.static_files.enabled {
        router = router.with_static_files(StaticFiles::new(
            &cfg.static_files.root,
            &cfg.static_files.default_document,
            default_mime_lookup(),
        ));
    }

    let server = Server::new(cfg, router);

    tokio::select! {
        res = server.start() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
