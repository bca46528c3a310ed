use anyhow::Result;
use bson::Bson;
use clap::Parser;
use mongo_roundtrip::cli::Cli;
use mongo_roundtrip::pipeline::run;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .init();

    let settings = args.into_settings()?;
    let report = run(&settings).await?;

    let found: Vec<serde_json::Value> = report
        .documents
        .into_iter()
        .map(|doc| Bson::Document(doc).into_relaxed_extjson())
        .collect();
    println!("{}", serde_json::to_string_pretty(&found)?);

    println!(
        "✅ Inserted {} document(s) with _id {}, found {}.",
        report.inserted.inserted_count,
        report.inserted.inserted_id,
        found.len()
    );
    Ok(())
}
