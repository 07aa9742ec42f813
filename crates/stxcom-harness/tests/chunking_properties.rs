//! Property tests: how serial input is split into chunks never changes what
//! is logged or displayed.

use std::time::Duration;

use proptest::prelude::*;
use stxcom_app::{App, Runtime};
use stxcom_core::SessionConfig;
use stxcom_harness::{SimDriver, SimEnv};
use stxcom_proto::{ETX, STX};

fn plain() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("no markers", |b| *b != STX && *b != ETX), 0..12)
}

/// Run the runtime over `chunks`, one per millisecond.
fn deliver(chunks: Vec<Vec<u8>>) -> SimDriver {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();

    rt.block_on(async move {
        let env = SimEnv::default();
        let driver = SimDriver::new(env.clone());
        for (i, chunk) in chunks.into_iter().enumerate() {
            driver.inject_serial(Duration::from_millis(i as u64), chunk);
        }

        let app = App::new(SessionConfig::default(), 38_400);
        Runtime::new(driver.clone(), env, app).run().await.unwrap();
        driver
    })
}

proptest! {
    #[test]
    fn chunking_is_invisible(
        spans in prop::collection::vec((plain(), plain()), 0..6),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let mut stream = Vec::new();
        let mut expected_log = Vec::new();
        let mut expected_display = Vec::new();
        for (noise, payload) in &spans {
            stream.extend_from_slice(noise);
            stream.push(STX);
            stream.extend_from_slice(payload);
            stream.push(ETX);

            expected_display.extend_from_slice(noise);
            expected_log.extend_from_slice(b"000 ");
            expected_log.extend_from_slice(payload);
            expected_log.push(b'\n');
        }

        let mut points: Vec<usize> = cuts.iter().map(|c| c.index(stream.len() + 1)).collect();
        points.sort_unstable();
        points.dedup();
        let mut chunks = Vec::new();
        let mut start = 0;
        for point in points.into_iter().chain(std::iter::once(stream.len())) {
            if point > start {
                chunks.push(stream[start..point].to_vec());
                start = point;
            }
        }

        let driver = deliver(chunks);
        prop_assert_eq!(driver.log(), expected_log);
        prop_assert_eq!(driver.displayed(), expected_display);
        prop_assert!(driver.written().is_empty());
    }
}
