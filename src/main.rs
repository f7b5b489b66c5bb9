#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = medprep_rust::run().await {
        eprintln!("medprep-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
