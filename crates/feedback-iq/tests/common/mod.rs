#![allow(dead_code)]

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SAMPLE_CSV: &str = "\
feedback_id,original_text,category,priority_level,priority_score,sentiment,urgency,ai_summary
FB-001,Checkout fails with a 500 error whenever I apply a coupon,Billing,CRITICAL,9.8,Negative,Immediate,Checkout broken with coupons
FB-002,Would love a dark mode,Feature Request,LOW,2.1,Positive,Low,
FB-003,Dashboard takes 20 seconds to load,Performance,HIGH,8.4,Negative,High,Slow dashboard
FB-004,Charged twice for the same order,Billing,HIGH,8.9,Negative,High,Duplicate charge
FB-005,Export button is hard to find,,MEDIUM,5.0,Neutral,,
";

/// Requests captured by a fake HTTP endpoint, in arrival order.
pub type Captured = Arc<Mutex<Vec<Value>>>;

/// Serves `POST /hook` on a background runtime, answering every request with `status`
/// after `delay`, and returns its URL and the captured JSON bodies.
pub fn spawn_endpoint(status: StatusCode, response: Value, delay: Duration) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    listener
        .set_nonblocking(true)
        .expect("nonblocking listener");
    let addr = listener.local_addr().expect("listener address");

    let state = captured.clone();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("test runtime");

        runtime.block_on(async move {
            let listener =
                tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            let app = Router::new().route(
                "/hook",
                post(move |Json(body): Json<Value>| {
                    let state = state.clone();
                    let response = response.clone();
                    async move {
                        state.lock().expect("capture mutex").push(body);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        (status, Json(response))
                    }
                }),
            );
            axum::serve(listener, app).await.expect("test server");
        });
    });

    (format!("http://{addr}/hook"), captured)
}

/// A URL on a port nothing listens on.
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind unused listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}/hook")
}
