//! Concurrent load against the shim with a mock management service.

use std::time::{Duration, Instant};

use user_api_sdk::UserApiClient;
use v2ray_user_api::upstream::StatRecord;

mod common;

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let api = common::MockManagement::new();
    api.set_stats(vec![StatRecord { name: "user>>>a@b.com>>>traffic>>>uplink".into(), value: 1 }]);
    let server = common::start_with_mock(api.clone()).await;

    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let start = Instant::now();
    let mut tasks = Vec::new();
    for task in 0..concurrency {
        let url = server.url();
        tasks.push(tokio::spawn(async move {
            let client = UserApiClient::new(&url);
            let mut latencies = Vec::new();
            for i in 0..requests_per_task {
                let req_start = Instant::now();
                if i % 2 == 0 {
                    let stats = client.query_traffic().await.unwrap();
                    assert_eq!(stats.len(), 1);
                } else {
                    client.remove_user(&format!("u{task}-{i}@b.com")).await.unwrap();
                }
                latencies.push(req_start.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies: Vec<Duration> = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    assert_eq!(all_latencies.len(), total_requests);
    assert_eq!(api.calls().len(), total_requests);

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");
}
