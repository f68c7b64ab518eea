//! Registration, settings and shutdown

use crate::common::{server, settings, settle, Collector};
use remcache::events::api::QueueKind;
use remcache::listeners::api::{ListenerCounts, RegionScope, RemoteType};
use remcache::server::api::{ServerError, ServerSettings};
use std::io::Write;

#[tokio::test]
async fn test_removed_listener_stops_receiving() {
    let server = server(settings(QueueKind::Pooled));
    let kept = Collector::new();
    let removed = Collector::new();
    server
        .add_listener("r", RemoteType::Local, kept.clone(), None)
        .unwrap();
    let removed_id = server
        .add_listener("r", RemoteType::Local, removed.clone(), Some("node-b".into()))
        .unwrap();
    assert_eq!(server.get_extra_info(removed_id).as_deref(), Some("node-b"));

    server.put("r", "before", "v").await.unwrap();
    assert!(removed.wait_for(1).await);
    assert!(server.remove_listener("r", removed_id).unwrap());
    server.put("r", "after", "v").await.unwrap();

    assert!(kept.wait_for(2).await);
    settle().await;
    assert_eq!(removed.keys(), vec!["before"]);
    assert_eq!(server.get_extra_info(removed_id), None);
    assert_eq!(
        server.listener_counts("r"),
        ListenerCounts {
            local: 1,
            cluster: 0
        }
    );
}

#[tokio::test]
async fn test_ids_are_unique_across_scopes() {
    let server = server(settings(QueueKind::Pooled));
    let mut ids = Vec::new();
    for scope in [
        RegionScope::region("a"),
        RegionScope::region("b"),
        RegionScope::All,
    ] {
        for remote_type in [RemoteType::Local, RemoteType::Cluster] {
            ids.push(
                server
                    .add_listener(scope.clone(), remote_type, Collector::new(), None)
                    .unwrap()
                    .get(),
            );
        }
    }

    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(server.statistics().listener_count(), 6);
}

#[tokio::test]
async fn test_dispose_keeps_listeners() {
    let server = server(settings(QueueKind::Pooled));
    let listener = Collector::new();
    server
        .add_listener("r", RemoteType::Local, listener.clone(), None)
        .unwrap();

    server.put("r", "k1", "v").await.unwrap();
    server.dispose("r").await.unwrap();
    assert!(server.get("r", "k1").await.unwrap().is_none());

    server.put("r", "k2", "v").await.unwrap();
    assert!(listener.wait_for(3).await);
    assert_eq!(listener.keys(), vec!["k1", "k2"]);
}

#[tokio::test]
async fn test_shutdown_is_final() {
    let server = server(settings(QueueKind::Pooled));
    let listener = Collector::new();
    server
        .add_listener("r", RemoteType::Local, listener.clone(), None)
        .unwrap();

    assert_eq!(server.shutdown(), 1);
    assert!(matches!(
        server.add_listener("r", RemoteType::Local, Collector::new(), None),
        Err(ServerError::ShutDown)
    ));

    let report = server.put("r", "k", "v").await.unwrap();
    assert_eq!(report.targets, 0);
    settle().await;
    assert!(listener.received().is_empty());
    assert!(server.statistics().shut_down);
}

#[tokio::test]
async fn test_server_from_settings_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "local-cluster-consistency = true\n\n[event-queue]\nkind = \"single\"\nmax-failure = 1"
    )
    .unwrap();

    let (settings, source) = ServerSettings::discover(Some(file.path())).await.unwrap();
    assert_eq!(source.as_deref(), Some(file.path()));

    let server = server(settings);
    let cluster = Collector::new();
    let local = Collector::new();
    let cluster_id = server
        .add_listener("r", RemoteType::Cluster, cluster, None)
        .unwrap();
    server
        .add_listener("r", RemoteType::Local, local.clone(), None)
        .unwrap();

    assert!(server.local_cluster_consistency());
    server.put_from("r", "k", "v", cluster_id).await.unwrap();
    assert!(local.wait_for(1).await);
}
