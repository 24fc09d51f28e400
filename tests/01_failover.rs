mod support;

use support::{Client, FakeTracker};

#[tokio::test]
async fn unknown_key_is_answered_by_secondary() {
    let primary = FakeTracker::spawn(|_| "ERR unknown_key key+not+found\n".to_string()).await;
    let secondary = FakeTracker::spawn(|_| "OK paths=1&path1=http://y/Missing\n".to_string()).await;
    let proxy = support::spawn_proxy(vec![primary.addr.clone()], vec![secondary.addr.clone()]).await;

    let mut client = Client::connect(proxy).await;
    let resp = client.request("GET_PATHS domain=D&key=Missing\n").await;

    assert_eq!(resp, "OK paths=1&path1=http://y/Missing\n");
    assert_eq!(primary.seen(), ["GET_PATHS domain=D&key=Missing\n"]);
    assert_eq!(secondary.seen(), ["GET_PATHS domain=D&key=Missing\n"]);
}

#[tokio::test]
async fn none_match_listing_falls_through() {
    let primary = FakeTracker::spawn(|_| "ERR none_match No+keys+match\n".to_string()).await;
    let secondary = FakeTracker::spawn(|_| "OK key_count=1&key_1=a\n".to_string()).await;
    let proxy = support::spawn_proxy(vec![primary.addr.clone()], vec![secondary.addr.clone()]).await;

    let mut client = Client::connect(proxy).await;
    let resp = client.request("list_keys domain=D&prefix=a\n").await;

    assert_eq!(resp, "OK key_count=1&key_1=a\n");
    assert_eq!(secondary.seen(), ["list_keys domain=D&prefix=a\n"]);
}

#[tokio::test]
async fn secondary_errors_are_returned_as_is() {
    let primary = FakeTracker::spawn(|_| "ERR unknown_key K\n".to_string()).await;
    let secondary = FakeTracker::spawn(|_| "ERR unknown_key K\n".to_string()).await;
    let proxy = support::spawn_proxy(vec![primary.addr.clone()], vec![secondary.addr.clone()]).await;

    let mut client = Client::connect(proxy).await;
    assert_eq!(client.request("get_paths key=K\n").await, "ERR unknown_key K\n");
    assert_eq!(secondary.seen().len(), 1);
}

#[tokio::test]
async fn mutating_requests_stay_on_primary() {
    let primary = FakeTracker::spawn(|_| "ERR unknown_key unknown_key\n".to_string()).await;
    let secondary = FakeTracker::spawn(|_| "OK \n".to_string()).await;
    let proxy = support::spawn_proxy(vec![primary.addr.clone()], vec![secondary.addr.clone()]).await;

    let mut client = Client::connect(proxy).await;
    assert_eq!(
        client.request("delete domain=D&key=K\n").await,
        "ERR unknown_key unknown_key\n"
    );
    assert_eq!(
        client.request("rename domain=D&from_key=a&to_key=b\n").await,
        "ERR unknown_key unknown_key\n"
    );
    assert!(secondary.seen().is_empty());
}

#[tokio::test]
async fn ordered_pool_skips_a_dead_secondary_member() {
    let primary = FakeTracker::spawn(|_| "ERR unknown_key K\n".to_string()).await;
    let secondary = FakeTracker::spawn(|_| "OK found\n".to_string()).await;
    let dead = support::dead_addr().await;
    let proxy = support::spawn_proxy(vec![primary.addr.clone()], vec![dead, secondary.addr.clone()]).await;

    let mut client = Client::connect(proxy).await;
    assert_eq!(client.request("get_paths key=K\n").await, "OK found\n");
}
