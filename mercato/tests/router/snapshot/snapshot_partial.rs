use std::time::Duration;

use mercato::{Interval, Mercato, MercatoError, SnapshotRequest};
use mercato_mock::MockBehavior;

use crate::helpers::{BTC, boom, dynamic, mercato_with};

#[tokio::test(start_paused = true)]
async fn weekly_timeout_leaves_an_explicit_gap() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    ctl.set_behavior(BTC, Interval::W1, MockBehavior::Hang).await;
    let mercato = mercato_with(&[c]);

    let snap = mercato
        .snapshot(
            BTC,
            SnapshotRequest::default()
                .with_limit(200)
                .with_timeout(Duration::from_secs(2)),
        )
        .await
        .unwrap();

    assert_eq!(snap.timeframes.len(), 7);
    assert_eq!(snap.populated().count(), 6);
    assert_eq!(snap.absent(), vec![Interval::W1]);
    assert!(snap.series(Interval::W1).is_none());
    assert!(matches!(
        snap.failures.get(&Interval::W1),
        Some(MercatoError::RequestTimeout { .. })
    ));
    assert_eq!(snap.failures.len(), 1);
    for (_, s) in snap.populated() {
        assert_eq!(s.len(), 200);
    }
    assert_eq!(ctl.total_calls().await, 7);
}

#[tokio::test(start_paused = true)]
async fn cancelled_fetches_leave_health_untouched() {
    let (c, _) = dynamic("p", MockBehavior::Hang).await;
    let mercato = Mercato::builder()
        .with_connector(c)
        .snapshot_intervals(&[Interval::H1])
        .request_timeout(Duration::from_millis(500))
        .build()
        .unwrap();

    let err = mercato
        .snapshot(BTC, SnapshotRequest::default())
        .await
        .unwrap_err();
    match err {
        MercatoError::SnapshotUnavailable { symbol, failures } => {
            assert_eq!(symbol, BTC);
            assert!(matches!(failures.as_slice(), [MercatoError::RequestTimeout { .. }]));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(mercato.health().health("p").is_none());
}

#[tokio::test]
async fn failed_interval_is_absent_and_explained() {
    let (primary, pctl) = dynamic("primary", MockBehavior::Generate(60_000.0)).await;
    pctl.set_behavior(BTC, Interval::D1, boom("primary")).await;
    let mercato = mercato_with(&[primary]);

    let snap = mercato
        .snapshot(BTC, SnapshotRequest::default())
        .await
        .unwrap();
    assert_eq!(snap.absent(), vec![Interval::D1]);
    assert!(matches!(
        snap.failures.get(&Interval::D1),
        Some(MercatoError::NoDataAvailable { errors, .. }) if errors.len() == 1
    ));
}

#[tokio::test]
async fn current_price_comes_from_shortest_populated_interval() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    ctl.set_behavior(BTC, Interval::I1m, boom("p")).await;
    let mercato = mercato_with(&[c]);

    let snap = mercato
        .snapshot(BTC, SnapshotRequest::default())
        .await
        .unwrap();
    let five = snap.series(Interval::I5m).unwrap();
    assert_eq!(Some(snap.current_price), five.last_close());
}

#[tokio::test]
async fn empty_series_is_present_but_not_priced() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    ctl.set_behavior(BTC, Interval::I1m, MockBehavior::Return(Vec::new()))
        .await;
    let mercato = Mercato::builder()
        .with_connector(c)
        .snapshot_intervals(&[Interval::I1m, Interval::H1])
        .build()
        .unwrap();

    let snap = mercato
        .snapshot(BTC, SnapshotRequest::default())
        .await
        .unwrap();
    assert!(snap.series(Interval::I1m).unwrap().is_empty());
    assert!(snap.absent().is_empty());
    assert_eq!(
        Some(snap.current_price),
        snap.series(Interval::H1).unwrap().last_close()
    );
}

#[tokio::test]
async fn all_intervals_failing_is_snapshot_unavailable() {
    let (c, _) = dynamic("p", boom("p")).await;
    let mercato = mercato_with(&[c]);

    let err = mercato
        .snapshot(BTC, SnapshotRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MercatoError::SnapshotUnavailable { ref failures, .. } if failures.len() == 7
    ));
}

#[tokio::test]
async fn snapshot_rejects_bad_arguments() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(1.0)).await;
    let mercato = mercato_with(&[c]);

    assert!(matches!(
        mercato.snapshot("", SnapshotRequest::default()).await,
        Err(MercatoError::InvalidArg(_))
    ));
    assert!(matches!(
        mercato
            .snapshot(BTC, SnapshotRequest::default().with_limit(0))
            .await,
        Err(MercatoError::InvalidArg(_))
    ));
    assert_eq!(ctl.total_calls().await, 0);
}

#[tokio::test]
async fn snapshot_json_marks_absence_with_null() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    ctl.set_behavior(BTC, Interval::W1, boom("p")).await;
    let mercato = mercato_with(&[c]);

    let snap = mercato
        .snapshot(BTC, SnapshotRequest::default().with_limit(5))
        .await
        .unwrap();
    let v = serde_json::to_value(&snap).unwrap();

    assert_eq!(v["symbol"], "BTC");
    assert!(v["currentPrice"].is_f64());
    assert!(v["timeframes"]["1w"].is_null());
    assert_eq!(v["timeframes"]["1h"]["candles"].as_array().unwrap().len(), 5);
    assert!(v["timeframes"]["1h"]["candles"][0]["openTime"].is_i64());
    assert!(v["failures"]["1w"].is_object());
}

#[tokio::test]
async fn snapshots_are_fresh_on_every_call() {
    let (c, ctl) = dynamic("p", MockBehavior::Generate(60_000.0)).await;
    let mercato = mercato_with(&[c]);

    let a = mercato.snapshot(BTC, SnapshotRequest::default()).await.unwrap();
    let b = mercato.snapshot(BTC, SnapshotRequest::default()).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(ctl.total_calls().await, 14);
}
