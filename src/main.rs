use clap::Parser;
use cloud_labs::core::checker::ApiChecker;
use cloud_labs::core::{
    ApiGateway, AwsServices, IdentityService, InMemoryServices, KeyValueStore, ObjectStore,
};
use cloud_labs::utils::{logger, validation::Validate};
use cloud_labs::{
    AwsClients, Cli, Command, DeploymentReport, InMemoryCloud, LabError, ProjectConfig,
    ProjectDeployer, ProjectDestroyer, Services, TeardownReport,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting cloud-labs");
    if cli.verbose {
        tracing::debug!("CLI arguments: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &Cli) -> Result<(), LabError> {
    if let Command::Check { url, api_key } = &cli.command {
        let report = ApiChecker::new(url, api_key)?.run().await?;
        println!("✅ API answered with {} ships", report.ships.len());
        if let Some(id) = &report.profile_checked {
            println!("✅ Profile of {} served", id);
        }
        if let Some(bytes) = report.photo_bytes {
            println!("✅ Photo served ({} bytes)", bytes);
        }
        return Ok(());
    }

    let config = cli.project_config()?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }
    tracing::info!(
        "📋 Project {} in {} (bucket {}, table {}, API {})",
        config.project.name,
        config.region(),
        config.bucket.name,
        config.table.name,
        config.api.name
    );

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - calls go to an in-memory cloud");
        let cloud = dry_run_cloud(&config);
        let result = provision(&cli.command, InMemoryServices::from(&cloud), config).await;

        println!("📝 Calls that would be made:");
        for (index, call) in cloud.journal().iter().enumerate() {
            println!("  {:>3}. {}", index + 1, call);
        }
        return result;
    }

    let clients = AwsClients::load(config.region()).await;
    provision(&cli.command, AwsServices::from(clients), config).await
}

/// The in-memory cloud knows the two service roles so a dry deploy gets past the IAM lookups.
fn dry_run_cloud(config: &ProjectConfig) -> InMemoryCloud {
    let role_arn = |name: &str| format!("arn:aws:iam::000000000000:role/{}", name);
    InMemoryCloud::new()
        .with_role(&config.api.dynamodb_role, &role_arn(&config.api.dynamodb_role))
        .with_role(&config.api.s3_role, &role_arn(&config.api.s3_role))
}

async fn provision<O, K, A, I>(
    command: &Command,
    services: Services<O, K, A, I>,
    config: ProjectConfig,
) -> Result<(), LabError>
where
    O: ObjectStore,
    K: KeyValueStore,
    A: ApiGateway,
    I: IdentityService,
{
    if matches!(command, Command::Destroy) {
        let report = ProjectDestroyer::new(services, config).run().await?;
        print_teardown(&report);
    } else {
        let report = ProjectDeployer::new(services, config).run().await?;
        print_deployment(&report);
    }
    Ok(())
}

fn print_deployment(report: &DeploymentReport) {
    println!("✅ Project deployed successfully!");
    println!(
        "📦 {} objects uploaded, {} items inserted",
        report.objects_uploaded, report.items_inserted
    );
    println!("🔗 API URL: {}", report.api_url);
    if let Some(value) = &report.api_key_value {
        println!("🔑 API Key: {}", value);
    }
    println!();
    println!("Test your API with:");
    println!("   cloud-labs check --url {} --api-key <key>", report.api_url);
    println!();
    println!("⚠️ WARNING: Copy the API Key value above to use in your requests!");
}

fn print_teardown(report: &TeardownReport) {
    println!("✅ Project deleted successfully!");
    println!(
        "🗑️ {} items, {} objects removed (table: {}, bucket: {})",
        report.items_deleted, report.objects_deleted, report.table_deleted, report.bucket_deleted
    );
    println!(
        "🗑️ {} REST API(s), {} API key(s), {} usage plan(s) removed",
        report.apis_deleted, report.api_keys_deleted, report.usage_plans_deleted
    );
}
