use mercato::{LevelKind, Mercato, SnapshotRequest};

mod common;
use common::{get_connectors, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mercato = get_connectors()
        .into_iter()
        .fold(Mercato::builder(), |b, c| b.with_connector(c))
        .build()?;

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "ETH".to_string());
    let report = mercato.analyze(&symbol, SnapshotRequest::default()).await?;
    let price = report.snapshot.current_price;

    println!("{} @ {price:.4}", report.snapshot.symbol);
    println!("top confluence zones:");
    for z in report.zones.iter().take(5) {
        let side = if z.center_price >= price { "above" } else { "below" };
        let supports = z
            .contributing_levels
            .iter()
            .filter(|l| l.kind == LevelKind::Support)
            .count();
        println!(
            "  {:.4}..{:.4} ({side}) score {:.1}, {} timeframes, {} of {} levels support",
            z.price_low,
            z.price_high,
            z.strength_score,
            z.interval_count,
            supports,
            z.contributing_levels.len()
        );
    }

    println!("latest EMAs:");
    for (interval, emas) in &report.emas {
        let latest: Vec<String> = emas
            .iter()
            .map(|e| match e.values.last().copied().flatten() {
                Some(v) => format!("ema{}={v:.4}", e.period),
                None => format!("ema{}=n/a", e.period),
            })
            .collect();
        println!("  {:>4}: {}", interval.as_str(), latest.join(" "));
    }
    Ok(())
}
