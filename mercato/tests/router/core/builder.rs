use mercato::{AnalysisConfig, Interval, Mercato, MercatoError};
use mercato_mock::MockBehavior;

use crate::helpers::{BTC, ETH, dynamic};

fn invalid(res: Result<Mercato, MercatoError>) -> bool {
    matches!(res, Err(MercatoError::InvalidArg(_)))
}

#[tokio::test]
async fn build_requires_a_connector() {
    assert!(invalid(Mercato::builder().build()));
}

#[tokio::test]
async fn build_rejects_unusable_settings() {
    let (c, _) = dynamic("p", MockBehavior::Generate(1.0)).await;

    assert!(invalid(
        Mercato::builder()
            .with_connector(c.clone())
            .default_limit(500)
            .max_limit(100)
            .build()
    ));
    assert!(invalid(
        Mercato::builder()
            .with_connector(c.clone())
            .snapshot_intervals(&[])
            .build()
    ));
    for analysis in [
        AnalysisConfig {
            swing_window: 0,
            ..AnalysisConfig::default()
        },
        AnalysisConfig {
            confluence_tolerance_pct: f64::NAN,
            ..AnalysisConfig::default()
        },
        AnalysisConfig {
            touch_tolerance_pct: -1.0,
            ..AnalysisConfig::default()
        },
        AnalysisConfig {
            ema_periods: vec![9, 0],
            ..AnalysisConfig::default()
        },
    ] {
        assert!(invalid(
            Mercato::builder()
                .with_connector(c.clone())
                .analysis(analysis)
                .build()
        ));
    }
}

#[tokio::test]
async fn snapshot_intervals_are_sorted_and_deduplicated() {
    let (c, _) = dynamic("p", MockBehavior::Generate(1.0)).await;
    let mercato = Mercato::builder()
        .with_connector(c)
        .snapshot_intervals(&[Interval::D1, Interval::I1m, Interval::D1])
        .build()
        .unwrap();
    assert_eq!(
        mercato.config().snapshot_intervals,
        vec![Interval::I1m, Interval::D1]
    );
}

#[tokio::test]
async fn default_snapshot_has_seven_intervals() {
    let (c, _) = dynamic("p", MockBehavior::Generate(1.0)).await;
    let mercato = Mercato::builder().with_connector(c).build().unwrap();
    let ivs = &mercato.config().snapshot_intervals;
    assert_eq!(ivs.len(), 7);
    assert!(!ivs.contains(&Interval::I3m));
}

#[tokio::test]
async fn per_symbol_priority_is_applied() {
    let (a, actl) = dynamic("a", MockBehavior::Generate(1.0)).await;
    let (b, bctl) = dynamic("b", MockBehavior::Generate(1.0)).await;
    let mercato = Mercato::builder()
        .with_connector(a.clone())
        .with_connector(b.clone())
        .prefer_symbol("eth", &[b])
        .build()
        .unwrap();

    mercato.candles(ETH, Interval::H1, Some(5)).await.unwrap();
    mercato.candles(BTC, Interval::H1, Some(5)).await.unwrap();

    assert_eq!(actl.calls(ETH, Interval::H1).await, 0);
    assert_eq!(bctl.calls(ETH, Interval::H1).await, 1);
    assert_eq!(actl.calls(BTC, Interval::H1).await, 1);
    assert_eq!(bctl.calls(BTC, Interval::H1).await, 0);
}

#[tokio::test]
async fn unlisted_connectors_remain_fallbacks() {
    let (a, actl) = dynamic("a", MockBehavior::Generate(1.0)).await;
    let (b, _) = dynamic("b", crate::helpers::boom("b")).await;
    let mercato = Mercato::builder()
        .with_connector(a)
        .with_connector(b.clone())
        .prefer_symbol(ETH, &[b])
        .build()
        .unwrap();

    mercato.candles(ETH, Interval::H1, Some(5)).await.unwrap();
    assert_eq!(actl.calls(ETH, Interval::H1).await, 1);
}
