// src/main.rs
use dotenvy::dotenv;

use pollbox::config::Config;
use pollbox::{init_tracing, start_server};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let config = Config::load();
    start_server(config).await;
}
