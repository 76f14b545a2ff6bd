//! Probeban L7 - Entry point

use std::net::SocketAddr;
use std::sync::Arc;

use probeban_http_defender::config::Config;
use probeban_http_defender::filter::{BanList, FilterChain, ProbeGuardConfig, ProbeGuardFilter};
use probeban_http_defender::proxy::{ProxyClient, ProxyConfig};
use probeban_http_defender::server::Server;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let banlist = Arc::new(BanList::load(&config.guard.banlist_path).await?);
    let banned = banlist.len().await;
    info!(path = %config.guard.banlist_path.display(), banned, "Banlist loaded");

    let guard = ProbeGuardFilter::new(
        ProbeGuardConfig::new(
            config.guard.identity_header.clone(),
            config.guard.whitelist.clone(),
        ),
        banlist,
    );

    let filter_chain = FilterChain::new().add_filter(Arc::new(guard));

    let proxy_config = ProxyConfig::new(config.proxy.upstream_url.clone())
        .with_timeout(config.proxy.timeout)
        .with_preserve_host(config.proxy.preserve_host);
    let proxy_client = ProxyClient::new(proxy_config)?;

    let server = Server::bind(addr, filter_chain, proxy_client).await?;
    server.run().await?;

    Ok(())
}
