#[tokio::main]
async fn main() -> anyhow::Result<()> {
    exporter_ui_terminal::run().await
}
