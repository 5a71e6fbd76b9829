#[docket_runtime::main]
async fn main() -> docket_runtime::Result<()> {
    let value = async { 7 }.await;
    anyhow::ensure!(value == 7, "unexpected value");
    Ok(())
}
