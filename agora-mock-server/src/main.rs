use std::{net::SocketAddr, sync::Arc};

use agora_mock_server::{router, MockServer};
use anyhow::Context;
use tokio::sync::Mutex;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Address to listen on
    #[structopt(long, env = "AGORA_LISTEN", default_value = "127.0.0.1:8000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let mut srv = MockServer::new();
    let demo = srv.seed_demo().context("seeding demo data")?;
    for (user, token) in &demo.sessions {
        tracing::info!(%user, %token, "demo session");
    }
    tracing::info!(post = %demo.post, "demo post");

    let app = router(Arc::new(Mutex::new(srv)));
    tracing::info!(addr = %opt.listen, "listening");
    axum::Server::bind(&opt.listen)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}
