//! Drives the batch coordinator against a live server over loopback HTTP.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use taxdesk_client::{HttpBatchTransport, TaxdeskClient};
use taxdesk_core::batch::{BatchConfig, BatchCoordinator, SubmitOutcome};
use taxdesk_core::email::MockEmailSender;
use taxdesk_core::notifications::{BatchNotificationRequest, BatchOutcome};
use taxdesk_server::{api::app_router, build_state_with_mailer, config::Config};
use tempfile::{tempdir, TempDir};

struct LiveServer {
    base_url: String,
    mailer: MockEmailSender,
    _dir: TempDir,
}

async fn start_server() -> LiveServer {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("e2e.db").to_string_lossy().to_string();
    let secret = BASE64.encode([9u8; 32]);
    let config = Config::from_lookup(|key| match key {
        "TD_DB_PATH" => Some(db_path.clone()),
        "TD_JWT_SECRET" => Some(secret.clone()),
        "TD_ADMIN_EMAILS" => Some("staff@firm.test".to_string()),
        _ => None,
    })
    .unwrap();

    let mailer = MockEmailSender::new();
    let state = build_state_with_mailer(&config, Arc::new(mailer.clone()))
        .await
        .unwrap();
    let router = app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    LiveServer {
        base_url: format!("http://{addr}"),
        mailer,
        _dir: dir,
    }
}

async fn signed_in_client(server: &LiveServer) -> (TaxdeskClient, String) {
    let client = TaxdeskClient::new(&server.base_url).unwrap();
    client
        .register("ada@example.com", "correct horse")
        .await
        .unwrap();
    let token = client
        .login("ada@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(token.token_type, "Bearer");
    (client, token.access_token)
}

async fn wait_for_emails(mailer: &MockEmailSender, expected: usize) {
    for _ in 0..200 {
        if mailer.len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!(
        "expected {} emails, got {}",
        expected,
        mailer.len()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn edits_within_the_window_produce_one_email() {
    let server = start_server().await;
    let (client, token) = signed_in_client(&server).await;

    let transport = HttpBatchTransport::new(client, token).unwrap();
    let coordinator = BatchCoordinator::new(
        transport,
        BatchConfig {
            debounce: Duration::from_millis(300),
        },
    );

    coordinator.record_edit(Some("personal"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.record_edit(Some("income"));
    coordinator.record_edit(Some("personal"));

    wait_for_emails(&server.mailer, 1).await;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let sent = server.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("Personal"));
    assert!(sent[0].text.contains("Income"));
    assert!(coordinator.pending().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn beacon_and_later_submit_of_same_batch_send_once() {
    let server = start_server().await;
    let (client, token) = signed_in_client(&server).await;

    let transport = HttpBatchTransport::new(client, token).unwrap();
    let coordinator = BatchCoordinator::new(
        transport,
        BatchConfig {
            debounce: Duration::from_secs(60),
        },
    );

    coordinator.record_edit(Some("rental"));
    coordinator.flush_on_hide();
    wait_for_emails(&server.mailer, 1).await;

    // The page came back; the same batch is submitted explicitly.
    assert_eq!(coordinator.submit_now().await, SubmitOutcome::Delivered);
    assert_eq!(server.mailer.len(), 1);
    assert!(coordinator.pending().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn client_reports_already_processed_batches() {
    let server = start_server().await;
    let (client, token) = signed_in_client(&server).await;

    let request = BatchNotificationRequest::new(uuid::Uuid::new_v4(), vec!["spouse".into()]);
    assert_eq!(
        client.notify_batch(&token, &request).await.unwrap(),
        BatchOutcome::Sent
    );
    assert_eq!(
        client.notify_batch(&token, &request).await.unwrap(),
        BatchOutcome::AlreadyProcessed
    );
    assert_eq!(server.mailer.len(), 1);
}
