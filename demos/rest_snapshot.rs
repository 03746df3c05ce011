use cricket_livefeed::ApiClient;

/// One-shot REST snapshot: backend health, live matches and their questions.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let base = std::env::var("LIVEFEED_API_URL").unwrap_or_else(|_| "http://localhost:5000/".into());
    let api = ApiClient::new(&base)?;

    match api.health().await {
        Ok(health) => println!("✅ Backend health: {}", health),
        Err(e) => println!("⚠️  Health check failed: {}", e),
    }

    let matches = api.live_matches().await?;
    println!("🏏 {} live matches", matches.len());

    for fixture in &matches {
        println!(
            "\n{} vs {} [{}]",
            fixture.home_team.as_deref().unwrap_or("?"),
            fixture.away_team.as_deref().unwrap_or("?"),
            fixture.status.as_deref().unwrap_or("unknown"),
        );
        match api.match_questions(&fixture.id).await {
            Ok(questions) => {
                for question in questions {
                    println!("   ❓ {}", question.text);
                }
            }
            Err(e) => println!("   ⚠️  No questions: {}", e),
        }
    }

    Ok(())
}
