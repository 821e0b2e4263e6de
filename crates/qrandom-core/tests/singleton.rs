//! Process-wide instance lifecycle.
//!
//! Kept in its own test binary, as a single test, because the instance is
//! global to the process.

use std::collections::HashMap;
use std::sync::Arc;

use qrandom_core::config::{API_TOKEN_KEY, API_URL_KEY, STORE_SIZE_KEY};
use qrandom_core::{PoolError, get_instance, get_instance_with, shutdown};

fn lookup(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> + Clone + use<> {
    let map: HashMap<&'static str, &'static str> = pairs.iter().copied().collect();
    move |key| map.get(key).map(|v| v.to_string())
}

#[test]
fn singleton_lifecycle() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Missing token: configuration error, nothing published.
    let err = get_instance_with(lookup(&[(API_URL_KEY, "http://127.0.0.1:9/random")]))
        .err()
        .expect("missing token must fail");
    assert!(matches!(err, PoolError::MissingSetting { key: API_TOKEN_KEY }));

    // Concurrent first access produces exactly one pool.
    let good = lookup(&[
        (API_URL_KEY, "http://127.0.0.1:9/random"),
        (API_TOKEN_KEY, "test-token"),
        (STORE_SIZE_KEY, "not-a-number"),
    ]);
    let pools: Vec<_> = (0..8)
        .map(|_| {
            let good = good.clone();
            std::thread::spawn(move || get_instance_with(good).unwrap())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();
    for p in &pools {
        assert!(Arc::ptr_eq(p, &pools[0]));
    }
    assert_eq!(pools[0].store_size(), 1000);
    assert_eq!(pools[0].min_threshold(), 200);
    assert!(pools[0].is_running());

    // Once published, the environment is no longer consulted.
    let again = get_instance().unwrap();
    assert!(Arc::ptr_eq(&again, &pools[0]));

    shutdown();
    assert!(!again.is_running());
    shutdown();
    assert!(Arc::ptr_eq(&get_instance().unwrap(), &again));
}
