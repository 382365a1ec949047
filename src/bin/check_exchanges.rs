use std::sync::Arc;
use std::time::Instant;

use trade_helper::domain::exchange::{ExchangeClient, ExchangeId};
use trade_helper::infrastructure::exchanges::ExchangeFactory;
use trade_helper::infrastructure::http::{ReqwestTransport, RetryPolicy};
use trade_helper::shared::types::MarketType;
use trade_helper::shared::utils::format_price;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let token = std::env::args().nth(1).unwrap_or_else(|| "BTC".to_string());
    println!("🔍 Checking exchange APIs with {}...", token);

    let transport = Arc::new(ReqwestTransport::new()?);
    let factory = ExchangeFactory::new(transport, RetryPolicy::default());

    let mut reachable = 0;
    for &id in ExchangeId::all() {
        let client = factory.create_client(id);
        println!("\n📊 {}", id.display_name());

        for market in [MarketType::Spot, MarketType::Perp] {
            if !client.supports(market) {
                println!("   {:<8} — not offered", market.label());
                continue;
            }
            let started = Instant::now();
            match client.resolve(&token, market).await {
                Ok(Some(found)) => {
                    reachable += 1;
                    println!(
                        "   ✅ {:<8} {} = {} ({} ms)",
                        market.label(),
                        found.symbol,
                        format_price(found.price),
                        started.elapsed().as_millis()
                    );
                    println!("      {}", found.url);
                }
                Ok(None) => println!("   ⚠️ {:<8} not resolved", market.label()),
                Err(e) => println!("   ❌ {:<8} {}", market.label(), e),
            }
        }
    }

    println!("\n✅ {} markets answered", reachable);
    Ok(())
}
