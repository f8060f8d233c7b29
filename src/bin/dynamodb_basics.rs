use clap::Parser;
use cloud_labs::core::table_lab::{lab_table_name, TableLab, DEFAULT_TABLE_PREFIX};
use cloud_labs::utils::logger;
use cloud_labs::utils::validation::{validate_aws_region, validate_table_name};
use cloud_labs::{AwsClients, InMemoryCloud, LabError};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dynamodb-basics")]
#[command(about = "Create a DynamoDB table, fill it, read it back and delete it")]
struct Args {
    /// AWS region to run in
    #[arg(long, default_value = "eu-west-1")]
    region: String,

    /// Table name prefix; the current epoch millis are appended
    #[arg(long, default_value = DEFAULT_TABLE_PREFIX)]
    table_prefix: String,

    /// Seconds to wait for the table to become active or disappear
    #[arg(long, default_value = "60")]
    wait_seconds: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Run against an in-memory table instead of AWS
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(&args).await {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<(), LabError> {
    validate_aws_region("region", &args.region)?;
    let table_name = lab_table_name(&args.table_prefix, chrono::Utc::now());
    validate_table_name("table_prefix", &table_name)?;

    tracing::info!(
        "🏷️ Using AWS Profile: {}",
        std::env::var("AWS_PROFILE").unwrap_or_else(|_| "default".to_string())
    );
    let wait = Duration::from_secs(args.wait_seconds);

    if args.dry_run {
        let cloud = InMemoryCloud::new();
        TableLab::new(cloud.clone(), table_name)
            .with_max_wait(wait)
            .run()
            .await?;
        for call in cloud.journal() {
            println!("  {}", call);
        }
    } else {
        let clients = AwsClients::load(&args.region).await;
        TableLab::new(clients.tables, table_name)
            .with_max_wait(wait)
            .run()
            .await?;
    }

    println!("🎉 DynamoDB basics lab completed!");
    Ok(())
}
