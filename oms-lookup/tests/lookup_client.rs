use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use oms_lookup::{LookupClient, LookupError, OrderLookup, Submission};
use oms_shared::Order;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

const SAMPLE: &str = include_str!("../../fixtures/order.json");

#[derive(Clone, Default)]
struct Server {
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
    release: Arc<Notify>,
}

async fn order(State(server): State<Server>, Path(uid): Path<String>) -> Response {
    server.hits.fetch_add(1, Ordering::SeqCst);
    server.seen.lock().unwrap().push(uid.clone());

    match uid.as_str() {
        "b563feb7b2b84b6test" => ([("content-type", "application/json")], SAMPLE).into_response(),
        "missing" => (StatusCode::NOT_FOUND, "order missing not found").into_response(),
        "silent" => StatusCode::NOT_FOUND.into_response(),
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "teapot" => StatusCode::IM_A_TEAPOT.into_response(),
        "garbled" => ([("content-type", "application/json")], "{\"order_uid\":").into_response(),
        "slow" => {
            server.release.notified().await;
            ([("content-type", "application/json")], SAMPLE).into_response()
        }
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn serve() -> (String, Server) {
    let server = Server::default();
    let app = Router::new()
        .route("/order/{uid}", get(order))
        .with_state(server.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), server)
}

#[tokio::test]
async fn test_found_order_is_decoded() {
    let (base, server) = serve().await;
    let client = LookupClient::new(&base).unwrap();

    let order = client.fetch_order("b563feb7b2b84b6test").await.unwrap();

    let expected: Order = serde_json::from_str(SAMPLE).unwrap();
    assert_eq!(order, expected);
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_not_found_uses_server_text() {
    let (base, _server) = serve().await;
    let client = LookupClient::new(&base).unwrap();

    let err = client.fetch_order("missing").await.unwrap_err();

    assert_eq!(err, LookupError::NotFound("order missing not found".to_string()));
}

#[tokio::test]
async fn test_not_found_without_body_gets_default_text() {
    let (base, _server) = serve().await;
    let client = LookupClient::new(&base).unwrap();

    let err = client.fetch_order("silent").await.unwrap_err();

    assert_eq!(err.to_string(), "Order silent not found");
}

#[tokio::test]
async fn test_other_statuses_report_code_and_reason() {
    let (base, _server) = serve().await;
    let client = LookupClient::new(&base).unwrap();

    let err = client.fetch_order("broken").await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");

    let err = client.fetch_order("teapot").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::Http {
            status: 418,
            reason: "I'm a teapot".to_string()
        }
    );
}

#[tokio::test]
async fn test_undecodable_body_is_a_transport_failure() {
    let (base, _server) = serve().await;
    let client = LookupClient::new(&base).unwrap();

    let err = client.fetch_order("garbled").await.unwrap_err();

    assert!(matches!(err, LookupError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_failure() {
    // Grab a free port and release it so nothing is listening there
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LookupClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.fetch_order("b563feb7b2b84b6test").await.unwrap_err();

    match err {
        LookupError::Transport(message) => {
            assert!(
                message.to_lowercase().contains("connection refused"),
                "cause missing from {:?}",
                message
            );
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_truncated_not_found_body_is_a_transport_failure() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // A 404 whose body ends before its declared length
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 100\r\n\r\nshort")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let client = LookupClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.fetch_order("missing").await.unwrap_err();

    assert!(
        matches!(err, LookupError::Transport(_)),
        "expected transport error, got {:?}",
        err
    );
}

#[tokio::test]
async fn test_submission_trims_input_and_sends_one_request() {
    let (base, server) = serve().await;
    let lookup = OrderLookup::new(LookupClient::new(&base).unwrap());

    let submission = lookup.submit("  b563feb7b2b84b6test \n").await;

    assert!(matches!(submission, Submission::Found(ref o) if o.order_uid == "b563feb7b2b84b6test"));
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
    assert_eq!(*server.seen.lock().unwrap(), vec!["b563feb7b2b84b6test".to_string()]);
    assert!(!lookup.is_loading());
}

#[tokio::test]
async fn test_blank_submission_sends_nothing() {
    let (base, server) = serve().await;
    let lookup = OrderLookup::new(LookupClient::new(&base).unwrap());

    assert_eq!(lookup.submit("   ").await, Submission::EmptyInput);
    assert_eq!(server.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_submission_is_refused_while_loading() {
    let (base, server) = serve().await;
    let lookup = Arc::new(OrderLookup::new(LookupClient::new(&base).unwrap()));

    let first = tokio::spawn({
        let lookup = lookup.clone();
        async move { lookup.submit("slow").await }
    });

    // Wait until the first request reached the server
    while server.hits.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(lookup.is_loading());
    assert_eq!(lookup.submit("b563feb7b2b84b6test").await, Submission::InFlight);

    server.release.notify_one();
    let first = first.await.unwrap();

    assert!(matches!(first, Submission::Found(_)));
    assert!(!lookup.is_loading());
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_loading_is_cleared_after_failure() {
    let (base, _server) = serve().await;
    let lookup = OrderLookup::new(LookupClient::new(&base).unwrap());

    let submission = lookup.submit("broken").await;

    assert!(matches!(submission, Submission::Failed(LookupError::Http { status: 500, .. })));
    assert!(!lookup.is_loading());
    assert!(matches!(lookup.submit("missing").await, Submission::Failed(LookupError::NotFound(_))));
}
