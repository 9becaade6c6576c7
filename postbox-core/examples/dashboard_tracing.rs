//! Example demonstrating engine tracing on a small dashboard session.
//!
//! Run with: cargo run -p postbox-core --example dashboard_tracing

use postbox_core::{Dashboard, Engine, MapMode, Postcard, SortKey};
use tracing_subscriber::{fmt, EnvFilter};

const SAMPLE: &str = r#"[
    {"id": "CN-1", "type": "收到", "region": "浙江杭州", "sendDate": "2024-01-02", "receiveDate": "2024-01-09"},
    {"id": "CN-12", "type": "寄出", "region": "内蒙古包头", "sendDate": "2024-02-01"},
    {"id": "JP-3", "type": "received", "country": "日本", "tags": ["temple"], "receiveDate": "2024-03-15"},
    {"id": "FR-8", "type": "sent", "country": "法国", "platform": "Postcrossing"}
]"#;

fn main() {
    fmt()
        .with_env_filter(EnvFilter::new("postbox_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Dashboard Tracing Demo ===\n");

    let records = match Postcard::parse_many(SAMPLE) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Failed to parse sample: {}", e);
            return;
        }
    };

    let mut dashboard = Dashboard::with_records(Engine::default(), records);
    dashboard.set_sort(SortKey::DateDesc);

    let view = dashboard.view();
    println!("\nAll cards ({}):", view.total_filtered_count);
    for card in &view.display_cards {
        println!("   {}", card.id.as_deref().unwrap_or("-"));
    }

    dashboard.toggle_map(MapMode::World);
    dashboard.click_map("Japan");
    let view = dashboard.view();
    println!("\nAfter clicking Japan ({}):", view.total_filtered_count);
    for bucket in &view.map.buckets {
        println!("   {:<16} {} (sent {}, received {})", bucket.name, bucket.total, bucket.sent, bucket.received);
    }
    println!("\nEvaluations: {}", dashboard.evaluations());
}
