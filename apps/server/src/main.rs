use anyhow::Context;
use tally::domain::config::ApiConfig;
use tally::kernel::config::load_config;
use tally_logger::Logger;
use tally_server::Server;

#[tally_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init_from_config(&cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}
