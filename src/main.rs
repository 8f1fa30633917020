//! The companies service.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl -X POST http://localhost:3000/companies \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"Acme","address":"1 Road Runner Way"}'

use std::process::ExitCode;
use std::sync::Arc;

use conduit::config::Config;
use conduit::{Router, Server, company, logging};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("conduit: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init() {
        eprintln!("conduit: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), conduit::Error> {
    let mediator = Arc::new(company::mediator());
    let app = company::routes(Router::new(), mediator);

    Server::bind(config.addr)
        .await?
        .shutdown_grace(config.shutdown_grace())
        .serve(app)
        .await
}
