use std::sync::Arc;
use std::time::Duration;

use oracle_core::{OriginHandler, Pair};
use oracle_middleware::HandlerBuilder;
use oracle_mock::MockHandler;

#[tokio::test]
async fn forced_failure_trips_blacklist_for_subsequent_calls() {
    let handler = HandlerBuilder::new("mock", Arc::new(MockHandler::new("mock"))).with_blacklist(Duration::from_secs(60)).build();

    let failing = Pair::new("FAIL", "USD").unwrap();
    let first = handler.fetch(&[failing]).await;
    assert!(first[0].error.is_some());

    // Second call hits the tripped blacklist rather than the mock again;
    // a healthy pair requested in the same batch is refused too, since the
    // blacklist gates the whole origin.
    let healthy = Pair::new("BTC", "USD").unwrap();
    let second = handler.fetch(&[healthy]).await;
    assert!(second[0].error.as_ref().unwrap().to_string().contains("blacklisted"));
}
