use mercato::{Interval, MercatoError};
use mercato_core::is_strictly_increasing;
use mercato_mock::{ANCHOR_MS, MockBehavior};
use proptest::prelude::*;

use crate::helpers::{BTC, candle, dynamic, mercato_with};

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(fut)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn fetched_series_is_ordered_unique_and_bounded(
        bars in prop::collection::vec((0i64..40, 1.0f64..1_000.0), 0..80),
        limit in 1usize..60,
    ) {
        let ms = Interval::I15m.millis();
        let raw: Vec<_> = bars
            .iter()
            .map(|&(slot, close)| candle(Interval::I15m, ANCHOR_MS - (slot + 1) * ms, close))
            .collect();
        let distinct = {
            let mut slots: Vec<i64> = bars.iter().map(|b| b.0).collect();
            slots.sort_unstable();
            slots.dedup();
            slots.len()
        };

        let (series, again) = block_on(async move {
            let (c, _) = dynamic("p", MockBehavior::Return(raw)).await;
            let mercato = mercato_with(&[c]);
            let a = mercato.candles(BTC, Interval::I15m, Some(limit)).await?;
            let b = mercato.candles(BTC, Interval::I15m, Some(limit)).await?;
            Ok::<_, MercatoError>((a, b))
        })
        .unwrap();

        prop_assert!(is_strictly_increasing(&series.candles));
        prop_assert_eq!(series.len(), distinct.min(limit));
        prop_assert_eq!(&series, &again);
    }
}
