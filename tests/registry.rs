mod common;

use std::sync::atomic::Ordering;

use futures_util::future::join_all;

use common::{params, path_str, Harness, NO_HOME_USER, UNREACHABLE_HOST};
use sshfinder_lib::config::FinderConfig;
use sshfinder_lib::remote::{list_directory, read_file, write_file};
use sshfinder_lib::ssh::AuthMethod;
use sshfinder_lib::FinderError;

#[tokio::test]
async fn test_create_returns_id_and_home() {
    let h = Harness::new();

    let (id, home) = h.registry.create(params("alice")).await.unwrap();

    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(home, path_str(&h.home_of("alice")));

    let session = h.registry.get(&id).unwrap();
    assert_eq!(session.home_dir, home);
    assert_eq!(session.username, "alice");
    assert_eq!(h.registry.count(), 1);
}

#[tokio::test]
async fn test_home_probe_falls_back_to_root() {
    let h = Harness::new();
    let (_, home) = h.registry.create(params(NO_HOME_USER)).await.unwrap();
    assert_eq!(home, "/");
}

#[tokio::test]
async fn test_bad_credentials_are_connection_errors() {
    let h = Harness::new();
    let mut bad = params("alice");
    bad.auth = AuthMethod::Password {
        password: "wrong".into(),
    };

    let err = h.registry.create(bad).await.unwrap_err();
    assert!(matches!(err, FinderError::Connection(_)));
    assert!(err.to_string().contains("alice@localhost:22"));
    assert_eq!(h.registry.count(), 0);
}

#[tokio::test]
async fn test_unreachable_host_is_connection_error() {
    let h = Harness::new();
    let mut unreachable = params("alice");
    unreachable.host = UNREACHABLE_HOST.into();

    let err = h.registry.create(unreachable).await.unwrap_err();
    assert!(matches!(err, FinderError::Connection(ref msg) if msg.contains("no route to host")));
}

#[tokio::test]
async fn test_blank_host_rejected() {
    let h = Harness::new();
    let mut blank = params("alice");
    blank.host = "  ".into();

    assert!(matches!(
        h.registry.create(blank).await,
        Err(FinderError::Validation(_))
    ));
}

#[tokio::test]
async fn test_unknown_session() {
    let h = Harness::new();
    let err = h.registry.get("deadbeef").unwrap_err();
    assert!(matches!(err, FinderError::SessionNotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let h = Harness::new();
    let (id, _) = h.registry.create(params("alice")).await.unwrap();

    assert!(h.registry.remove(&id).await);
    assert!(!h.registry.remove(&id).await);

    assert_eq!(h.registry.count(), 0);
    assert_eq!(h.closes.load(Ordering::SeqCst), 1);
    assert!(matches!(
        h.registry.get(&id),
        Err(FinderError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let h = Harness::new();
    let alice = h.connect("alice").await;
    let bob = h.connect("bob").await;

    assert_ne!(alice.id, bob.id);
    assert_ne!(alice.home_dir, bob.home_dir);

    let secret = format!("{}/diary.txt", alice.home_dir);
    write_file(&alice, &secret, "dear diary", None).await.unwrap();

    let bob_view = list_directory(&bob, &bob.home_dir, true).await.unwrap();
    assert!(bob_view.is_empty());

    h.registry.remove(&bob.id).await;
    assert_eq!(read_file(&alice, &secret).await.unwrap().content, "dear diary");
    assert_eq!(h.registry.count(), 1);
    assert!(h.registry.get(&alice.id).is_ok());
}

#[tokio::test]
async fn test_close_all_clears_registry() {
    let h = Harness::new();
    for user in ["alice", "bob", "carol"] {
        h.registry.create(params(user)).await.unwrap();
    }

    h.registry.close_all().await;

    assert_eq!(h.registry.count(), 0);
    assert_eq!(h.closes.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_commands_on_one_session_are_serialized() {
    let h = Harness::new();
    let session = h.connect("alice").await;

    // mkdir is atomic: it fails if another command holds the marker directory
    let probe = "mkdir .exclusive && sleep 0.2 && rmdir .exclusive";
    let results = join_all((0..4).map(|_| session.execute(probe))).await;

    for result in results {
        let result = result.unwrap();
        assert!(result.success(), "overlap detected: {}", result.stderr_text());
    }
}

#[tokio::test]
async fn test_timeout_surfaces_and_session_survives() {
    let config = FinderConfig {
        command_timeout_secs: 1,
        ..FinderConfig::default()
    };
    let h = Harness::with_config(config);
    let session = h.connect("alice").await;

    let err = session.execute("sleep 5").await.unwrap_err();
    assert!(matches!(err, FinderError::Timeout(1)));
    assert_eq!(err.status_code(), 504);

    let result = session.execute("echo still here").await.unwrap();
    assert_eq!(result.stdout_text(), "still here\n");
    assert!(h.registry.get(&session.id).is_ok());
}

#[tokio::test]
async fn test_nonzero_exit_is_not_an_executor_error() {
    let h = Harness::new();
    let session = h.connect("alice").await;

    let result = session.execute("echo oops >&2; exit 3").await.unwrap();
    assert_eq!(result.exit_code, 3);
    assert_eq!(result.stderr_text(), "oops\n");
}
