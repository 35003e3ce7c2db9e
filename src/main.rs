mod app;
mod config;
mod storage;
mod utils;

use color_eyre::Result;
use dotenv::dotenv;

#[actix_web::main]
async fn main() -> Result<()> {
  dotenv().ok();
  // Default to a useful log level when nothing is set:
  if std::env::var("RUST_LOG").is_err() {
    std::env::set_var("RUST_LOG", "info,actix_web=info");
  }
  env_logger::init();
  app::run().await
}
