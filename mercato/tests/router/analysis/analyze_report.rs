use std::sync::Arc;

use mercato::{CandleConnector, Interval, Mercato, SnapshotRequest};
use mercato_mock::{MockBehavior, MockConnector};

use crate::helpers::{BTC, ETH, boom, dynamic, mercato_with};

#[tokio::test]
async fn btc_end_to_end_over_seven_intervals() {
    let mock: Arc<dyn CandleConnector> = Arc::new(MockConnector::new());
    let mercato = mercato_with(&[mock]);

    let report = mercato
        .analyze(BTC, SnapshotRequest::default().with_limit(200))
        .await
        .unwrap();
    let snap = &report.snapshot;

    assert_eq!(snap.populated().count(), 7);
    assert!(snap.failures.is_empty());
    for (_, s) in snap.populated() {
        assert_eq!(s.len(), 200);
    }
    assert_eq!(
        Some(snap.current_price),
        snap.series(Interval::I1m).unwrap().last_close()
    );

    assert!(!report.zones.is_empty());
    for w in report.zones.windows(2) {
        assert!(w[0].strength_score >= w[1].strength_score);
    }
    for z in &report.zones {
        assert!(z.price_low <= z.center_price && z.center_price <= z.price_high);
        assert!(z.interval_count >= 1);
    }

    assert_eq!(report.emas.len(), 7);
    for series in report.emas.values() {
        let periods: Vec<usize> = series.iter().map(|e| e.period).collect();
        assert_eq!(periods, vec![9, 21, 50, 100, 200]);
        let longest = &series[4];
        assert_eq!(longest.values.len(), 200);
        assert_eq!(longest.values.iter().filter(|v| v.is_some()).count(), 1);
    }
}

#[tokio::test]
async fn absent_intervals_have_no_analysis_entries() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(3_000.0)).await;
    ctl.set_behavior(ETH, Interval::W1, boom("p")).await;
    ctl.set_behavior(ETH, Interval::D1, MockBehavior::Return(Vec::new()))
        .await;
    let mercato = mercato_with(&[c]);

    let report = mercato
        .analyze(ETH, SnapshotRequest::default())
        .await
        .unwrap();

    assert!(!report.levels.contains_key(&Interval::W1));
    assert!(!report.emas.contains_key(&Interval::W1));
    // Present but empty: analyzed, yielding nothing.
    assert_eq!(report.levels.get(&Interval::D1).map(Vec::len), Some(0));
    assert_eq!(report.levels.len(), 6);
    assert!(
        report
            .all_levels()
            .iter()
            .all(|l| l.source_interval != Interval::W1)
    );
}

#[tokio::test]
async fn report_serializes_undefined_ema_as_null() {
    let mock: Arc<dyn CandleConnector> = Arc::new(MockConnector::new());
    let mercato = Mercato::builder()
        .with_connector(mock)
        .snapshot_intervals(&[Interval::H1])
        .build()
        .unwrap();

    let report = mercato
        .analyze("sol", SnapshotRequest::default().with_limit(30))
        .await
        .unwrap();
    let v = serde_json::to_value(&report).unwrap();

    let ema9 = &v["emas"]["1h"][0];
    assert_eq!(ema9["period"], 9);
    assert!(ema9["values"][7].is_null());
    assert!(ema9["values"][8].is_f64());
    assert_eq!(v["snapshot"]["symbol"], "SOL");
}
