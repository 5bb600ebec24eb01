use anyhow::Result;

#[tokio::main]
pub async fn main() -> Result<()> {
    tron_wallet_log::start_server().await
}
