use crate::{api::RefreshConfig, config, error, info, server::start_proxy_server};

/// Runs the token refresh proxy until the process is stopped.
pub async fn serve() {
    let refresh_config = match RefreshConfig::from_env() {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    };

    info!("Token refresh proxy listening on {}", config::proxy_addr());
    if let Err(e) = start_proxy_server(refresh_config).await {
        error!("Proxy stopped: {}", e);
    }
}
