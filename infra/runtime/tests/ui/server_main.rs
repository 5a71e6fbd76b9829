#[docket_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    tokio::task::yield_now().await;
    Ok(())
}
