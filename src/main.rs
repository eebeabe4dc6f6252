#[tokio::main]
async fn main() -> anyhow::Result<()> {
    classfocus::run().await
}
