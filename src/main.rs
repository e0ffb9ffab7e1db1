#[tokio::main]
async fn main() {
    if let Err(err) = riskgraph::mcp::server::run_stdio().await {
        eprintln!("riskgraph: {}", err);
        std::process::exit(1);
    }
}
