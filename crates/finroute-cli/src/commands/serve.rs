//! Serve command

use crate::app::ServeArgs;
use anyhow::Result;
use finroute_core::Config;

pub async fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    eprintln!("Starting finroute server on http://{}", config.server.bind);
    finroute_server::run_server(&config).await
}
