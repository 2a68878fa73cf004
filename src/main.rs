use anyhow::Result;
use clap::{arg, command, Parser};
use std::time::Duration;
use user_data_aggregator::application::aggregator::UserDataAggregator;
use user_data_aggregator::application::Aggregator;
use user_data_aggregator::domain::models::{Comment, Friend, User};
use user_data_aggregator::infrastructure::memory::{InMemoryDirectory, Latency};

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Aggregates the current user, their comments and suggested friends from simulated sources"
)]
struct AggProgram {
    /// Simulated latency of the comment source in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    comments_delay_ms: u64,

    /// Simulated latency of the friend source in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    friends_delay_ms: u64,

    /// Time each dependent source gets before falling back to an empty result
    #[arg(short, long, default_value_t = 2000)]
    branch_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = AggProgram::parse();

    let latency = Latency::builder()
        .comments(Duration::from_millis(args.comments_delay_ms))
        .friends(Duration::from_millis(args.friends_delay_ms))
        .build();
    let directory = InMemoryDirectory::new(User::new("12", "nagy"), latency)
        .with_comments("12", vec![Comment::new("1", "nooooooooo")])
        .with_friends("12", vec![Friend::new("233", "ahmed")]);

    let aggregator = UserDataAggregator::builder()
        .user_resolver(directory.clone())
        .comment_fetcher(directory.clone())
        .friend_fetcher(directory)
        .branch_timeout(Duration::from_millis(args.branch_timeout_ms))
        .build();

    let result = aggregator.aggregate().await;
    aggregator.close();

    let aggregated = result?;
    println!("{}", serde_json::to_string_pretty(&aggregated)?);

    tracing::info!("Shutdown complete");
    Ok(())
}
