use std::time::Duration;

use mercato::{Mercato, SnapshotRequest};

mod common;
use common::{get_connectors, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mercato = get_connectors()
        .into_iter()
        .fold(Mercato::builder(), |b, c| b.with_connector(c))
        .build()?;

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "BTC".to_string());
    let snap = mercato
        .snapshot(
            &symbol,
            SnapshotRequest::default()
                .with_limit(200)
                .with_timeout(Duration::from_secs(10)),
        )
        .await?;

    println!("{} current price: {:.4}", snap.symbol, snap.current_price);
    for (interval, series) in &snap.timeframes {
        match series {
            Some(s) => println!(
                "  {:>4}: {:>4} bars, last close {:?}",
                interval.as_str(),
                s.len(),
                s.last_close()
            ),
            None => println!(
                "  {:>4}: absent ({})",
                interval.as_str(),
                snap.failures
                    .get(interval)
                    .map_or_else(|| "unknown".to_string(), ToString::to_string)
            ),
        }
    }
    Ok(())
}
