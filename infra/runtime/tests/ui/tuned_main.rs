#[docket_runtime::main(server, worker_threads = 2, thread_name = "docket-ui", shutdown_timeout_ms = 250)]
async fn main() -> anyhow::Result<()> {
    let name = tokio::spawn(async { std::thread::current().name().map(ToOwned::to_owned) }).await?;
    anyhow::ensure!(name.as_deref() == Some("docket-ui"), "unexpected worker name {name:?}");
    Ok(())
}
