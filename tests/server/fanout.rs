//! Who receives which mutation

use crate::common::{server, settings, settle, Collector, Received};
use remcache::events::api::{CacheElement, QueueKind};
use remcache::listeners::api::{ListenerId, RegionScope, RemoteType};

#[tokio::test]
async fn test_all_mutation_kinds_in_order() {
    let server = server(settings(QueueKind::Pooled));
    let listener = Collector::new();
    server
        .add_listener("users", RemoteType::Local, listener.clone(), None)
        .unwrap();

    server.put("users", "k1", "alice").await.unwrap();
    server.remove("users", "k1").await.unwrap();
    server.remove_all("users").await.unwrap();
    server.dispose("users").await.unwrap();

    assert!(listener.wait_for(4).await);
    assert_eq!(
        listener.received(),
        vec![
            Received::Put {
                key: "k1".into(),
                value: "alice".into()
            },
            Received::Remove { key: "k1".into() },
            Received::RemoveAll {
                region: "users".into()
            },
            Received::Dispose {
                region: "users".into()
            },
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_single_queues_deliver_in_order() {
    let server = server(settings(QueueKind::Single));
    let listener = Collector::new();
    server
        .add_listener("orders", RemoteType::Cluster, listener.clone(), None)
        .unwrap();

    let expected: Vec<String> = (0..40).map(|i| format!("order-{i:02}")).collect();
    for key in &expected {
        server.put("orders", key, "v").await.unwrap();
    }

    assert!(listener.wait_for(expected.len()).await);
    assert_eq!(listener.keys(), expected);
}

#[tokio::test]
async fn test_origin_is_never_echoed() {
    let server = server(settings(QueueKind::Pooled));
    let local = Collector::new();
    let cluster = Collector::new();
    let everywhere = Collector::new();
    server
        .add_listener("r", RemoteType::Local, local.clone(), None)
        .unwrap();
    server
        .add_listener("r", RemoteType::Cluster, cluster.clone(), None)
        .unwrap();
    server
        .add_listener(RegionScope::All, RemoteType::Local, everywhere.clone(), None)
        .unwrap();

    for origin in [&local, &cluster, &everywhere] {
        let origin_id = origin.id().unwrap();
        server
            .update(CacheElement::new("r", format!("from-{origin_id}"), "v"), origin_id)
            .await
            .unwrap();
    }

    // the cluster origin does not reach the local listener
    assert!(local.wait_for(1).await);
    assert!(cluster.wait_for(2).await);
    assert!(everywhere.wait_for(2).await);
    settle().await;
    assert_eq!(local.keys(), vec!["from-3"]);
    assert_eq!(cluster.keys(), vec!["from-1", "from-3"]);
    assert_eq!(everywhere.keys(), vec!["from-1", "from-2"]);
}

#[tokio::test]
async fn test_consistency_toggle_at_runtime() {
    let server = server(settings(QueueKind::Pooled));
    let cluster = Collector::new();
    let local = Collector::new();
    let cluster_id = server
        .add_listener("r", RemoteType::Cluster, cluster, None)
        .unwrap();
    server
        .add_listener("r", RemoteType::Local, local.clone(), None)
        .unwrap();

    let skipped = server.put_from("r", "k1", "v", cluster_id).await.unwrap();
    server.set_local_cluster_consistency(true);
    let forwarded = server.put_from("r", "k2", "v", cluster_id).await.unwrap();

    assert_eq!((skipped.targets, forwarded.targets), (0, 1));
    assert!(local.wait_for(1).await);
    settle().await;
    assert_eq!(local.keys(), vec!["k2"]);
}

#[tokio::test]
async fn test_unregistered_origin_reaches_everyone() {
    let server = server(settings(QueueKind::Pooled));
    let local = Collector::new();
    let cluster = Collector::new();
    server
        .add_listener("r", RemoteType::Local, local.clone(), None)
        .unwrap();
    server
        .add_listener("r", RemoteType::Cluster, cluster.clone(), None)
        .unwrap();

    let report = server
        .put_from("r", "k", "v", ListenerId::new(4242))
        .await
        .unwrap();

    assert_eq!(report.enqueued, 2);
    assert!(local.wait_for(1).await);
    assert!(cluster.wait_for(1).await);
}

#[tokio::test]
async fn test_regions_are_isolated() {
    let server = server(settings(QueueKind::Pooled));
    let users = Collector::new();
    let orders = Collector::new();
    server
        .add_listener("users", RemoteType::Local, users.clone(), None)
        .unwrap();
    server
        .add_listener("orders", RemoteType::Local, orders.clone(), None)
        .unwrap();

    server.put("users", "u1", "v").await.unwrap();
    server.put("orders", "o1", "v").await.unwrap();

    assert!(users.wait_for(1).await);
    assert!(orders.wait_for(1).await);
    settle().await;
    assert_eq!(users.keys(), vec!["u1"]);
    assert_eq!(orders.keys(), vec!["o1"]);
}
