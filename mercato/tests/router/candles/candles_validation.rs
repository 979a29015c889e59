use std::sync::Arc;

use mercato::{CandleConnector, Interval, Mercato, MercatoError};
use mercato_core::is_strictly_increasing;
use mercato_mock::{ANCHOR_MS, MockBehavior};

use crate::helpers::{BTC, IntervalLimited, candle, dynamic, mercato_with};

#[tokio::test]
async fn unknown_interval_token_is_rejected_before_any_call() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    let mercato = mercato_with(&[c]);

    for token in ["2h", "30m", "", "1M"] {
        let err = mercato.candles_str(BTC, token, None).await.unwrap_err();
        assert!(
            matches!(err, MercatoError::InvalidInterval { ref interval } if interval == token),
            "{token}: {err:?}"
        );
    }
    assert_eq!(ctl.total_calls().await, 0);

    let s = mercato.candles_str(BTC, "15m", Some(3)).await.unwrap();
    assert_eq!(s.interval, Interval::I15m);
}

#[tokio::test]
async fn limit_defaults_clamps_and_rejects_zero() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    let mercato = Mercato::builder()
        .with_connector(c)
        .default_limit(20)
        .max_limit(50)
        .build()
        .unwrap();

    assert_eq!(mercato.candles(BTC, Interval::H1, None).await.unwrap().len(), 20);
    assert_eq!(mercato.candles(BTC, Interval::H1, Some(500)).await.unwrap().len(), 50);
    assert!(matches!(
        mercato.candles(BTC, Interval::H1, Some(0)).await,
        Err(MercatoError::InvalidArg(_))
    ));
    assert_eq!(ctl.total_calls().await, 2);
}

#[tokio::test]
async fn symbols_are_trimmed_and_uppercased() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    let mercato = mercato_with(&[c]);

    let s = mercato.candles("  btc ", Interval::I5m, Some(5)).await.unwrap();
    assert_eq!(s.symbol, BTC);
    assert_eq!(ctl.calls(BTC, Interval::I5m).await, 1);

    assert!(matches!(
        mercato.candles("   ", Interval::I5m, None).await,
        Err(MercatoError::InvalidArg(_))
    ));
}

#[tokio::test]
async fn provider_payload_is_normalized() {
    let ms = Interval::H1.millis();
    let t0 = ANCHOR_MS - 10 * ms;
    // Newest first, with a duplicate bar whose first occurrence must win.
    let raw = vec![
        candle(Interval::H1, t0 + 3 * ms, 104.0),
        candle(Interval::H1, t0 + 2 * ms, 103.0),
        candle(Interval::H1, t0 + 3 * ms, 999.0),
        candle(Interval::H1, t0 + ms, 102.0),
        candle(Interval::H1, t0, 101.0),
    ];
    let (c, _) = dynamic("p", MockBehavior::Return(raw)).await;
    let mercato = mercato_with(&[c]);

    let s = mercato.candles(BTC, Interval::H1, Some(3)).await.unwrap();
    assert!(is_strictly_increasing(&s.candles));
    let closes: Vec<f64> = s.closes();
    assert_eq!(closes, vec![102.0, 103.0, 104.0]);
    assert_eq!(s.last_close(), Some(104.0));
}

#[tokio::test]
async fn empty_payload_is_an_empty_series() {
    let (c, _) = dynamic("p", MockBehavior::Return(Vec::new())).await;
    let mercato = mercato_with(&[c]);

    let s = mercato.candles(BTC, Interval::D1, None).await.unwrap();
    assert!(s.is_empty());
    assert!(mercato.health().health("p").unwrap().healthy);
}

#[tokio::test]
async fn interval_nobody_serves_is_unsupported() {
    let hourly: Arc<dyn CandleConnector> = Arc::new(IntervalLimited {
        name: "hourly",
        intervals: &[Interval::H1, Interval::H4],
    });
    let mercato = mercato_with(&[hourly]);

    assert!(matches!(
        mercato.candles(BTC, Interval::W1, None).await,
        Err(MercatoError::Unsupported { .. })
    ));
    assert!(mercato.candles(BTC, Interval::H4, Some(5)).await.is_ok());
}

#[tokio::test]
async fn connectors_lacking_the_interval_are_skipped() {
    let hourly: Arc<dyn CandleConnector> = Arc::new(IntervalLimited {
        name: "hourly",
        intervals: &[Interval::H1],
    });
    let (daily, ctl) = dynamic("daily", MockBehavior::Generate(60_000.0)).await;
    let mercato = mercato_with(&[hourly, daily]);

    mercato.candles(BTC, Interval::D1, Some(5)).await.unwrap();
    assert_eq!(ctl.calls(BTC, Interval::D1).await, 1);
    mercato.candles(BTC, Interval::H1, Some(5)).await.unwrap();
    assert_eq!(ctl.calls(BTC, Interval::H1).await, 0);
}
