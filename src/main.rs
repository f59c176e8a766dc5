use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    bearer_guard::app::run().await
}
