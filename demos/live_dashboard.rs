use cricket_livefeed::{
    EventClass, LiveBoard, LiveFeedClient, LiveFeedOptions, Subscription,
};
use std::time::Duration;

/// Follows the live match feed and the questions of one match, printing a
/// small dashboard and connection stats.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cricket_livefeed=debug".into()),
        )
        .init();

    let url = std::env::var("LIVEFEED_URL").unwrap_or_else(|_| "ws://localhost:5000/socket".into());
    let match_id = std::env::var("LIVEFEED_MATCH_ID").ok();

    println!("📡 Connecting to: {}\n", url);
    let client = LiveFeedClient::new(&url, LiveFeedOptions::from_env()?)?;
    let mut updates = client.on_any();

    client.subscribe(Subscription::LiveMatches);
    if let Some(match_id) = &match_id {
        client.select_match(match_id.clone());
    }

    if let Err(e) = client.connect().await {
        println!("⚠️  Initial connect failed ({}), retrying in the background", e);
    }

    let mut board = LiveBoard::new();
    let mut stats_tick = tokio::time::interval(Duration::from_secs(10));

    loop {
        tokio::select! {
            Some(notification) = updates.recv() => {
                let changed = board.apply(&notification);
                match notification.class {
                    EventClass::Match if changed => {
                        println!("🏏 {} matches ({} live)", board.matches().len(), board.live_matches().count());
                    }
                    EventClass::Question if changed => {
                        if let Some(match_id) = &match_id {
                            for question in board.questions(match_id) {
                                println!("❓ [{}] {}", question.id, question.text);
                            }
                        }
                    }
                    EventClass::Generic => println!("ℹ️  {}: {}", notification.event_type, notification.data),
                    _ => {}
                }
            }
            _ = stats_tick.tick() => {
                let stats = client.stats();
                println!(
                    "{} events={} questions={} avg_latency={:.1}ms uptime={}s",
                    if stats.is_connected { "🟢" } else { "🔴" },
                    stats.events_received,
                    stats.questions_received,
                    stats.average_latency_ms,
                    stats.uptime_seconds,
                );
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("\nDisconnecting...");
    client.disconnect();
    Ok(())
}
