use reiseklar_auth_axum::GateState;

mod pages;
mod server;

use crate::server::{init_tracing, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_gate");

    let state = GateState::from_env()?;
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    serve(port, pages::router(state)).await?;
    Ok(())
}
