use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    policy_cli::main_entry().await
}
