//! Concurrent conversion tests.

use page2pdf_api::prelude::*;
use page2pdf_api::service::{self, ConversionRequest};
use page2pdf_api::session::mock::{MockBehavior, MockSessionFactory};
use std::time::Duration;
use tokio::task::JoinSet;

/// Concurrent requests each own one session and release it.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_conversions_never_share_sessions() {
    let factory = MockSessionFactory::with_behavior(MockBehavior {
        navigation_delay: Duration::from_millis(20),
        ..Default::default()
    });
    let counters = factory.counters();
    let backend: SharedBackend = Arc::new(BrowserBackend::new(
        factory,
        BrowserSettings {
            settle_delay: Duration::ZERO,
            ..BrowserSettings::default()
        },
    ));

    let mut tasks = JoinSet::new();

    for n in 0..16 {
        let backend = Arc::clone(&backend);
        tasks.spawn_blocking(move || {
            service::convert(
                backend.as_ref(),
                &ConversionRequest::new(format!("https://docs.example.com/{}", n)),
            )
        });
    }

    while let Some(result) = tasks.join_next().await {
        let response = result.expect("Task should complete without panic");
        assert!(response.unwrap().data.starts_with(b"%PDF-"));
    }

    assert_eq!(counters.opened(), 16);
    assert_eq!(counters.closed(), 16);
    assert_eq!(counters.navigated().len(), 16);
}

/// Failures in some requests do not affect the others.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_outcomes() {
    let healthy: SharedBackend = Arc::new(BrowserBackend::new(
        MockSessionFactory::new(),
        BrowserSettings {
            settle_delay: Duration::ZERO,
            ..BrowserSettings::default()
        },
    ));
    let failing_factory = MockSessionFactory::with_behavior(MockBehavior {
        fail_print: Some("Printing failed".to_string()),
        ..Default::default()
    });
    let failing_counters = failing_factory.counters();
    let failing: SharedBackend = Arc::new(BrowserBackend::new(
        failing_factory,
        BrowserSettings {
            settle_delay: Duration::ZERO,
            ..BrowserSettings::default()
        },
    ));

    let mut tasks = JoinSet::new();

    for n in 0..10 {
        let backend = if n % 2 == 0 {
            Arc::clone(&healthy)
        } else {
            Arc::clone(&failing)
        };
        tasks.spawn_blocking(move || {
            (
                n,
                service::convert(backend.as_ref(), &ConversionRequest::new("https://example.com")),
            )
        });
    }

    while let Some(result) = tasks.join_next().await {
        let (n, outcome) = result.expect("Task should complete without panic");
        assert_eq!(outcome.is_ok(), n % 2 == 0);
    }

    assert_eq!(failing_counters.closed(), 5);
}
