use anyhow::Result;
use clap::Parser;
use clipyard_cli::{format_report, init_tracing};
use clipyard_core::Config;
use clipyard_processing::RelocationEngine;
use clipyard_storage::create_storage;

#[derive(Parser, Debug)]
#[command(name = "clipyard-organize")]
#[command(about = "Move object-storage files into an execution folder")]
struct Args {
    /// Target folder inside the bucket, used as given
    #[arg(value_parser = non_blank)]
    execution_folder: String,

    /// Object URLs to move (e.g. http://minio:9000/nca-toolkit/clip.mp4)
    #[arg(required_unless_present = "all_root", conflicts_with = "all_root")]
    file_urls: Vec<String>,

    /// Move every object at the bucket root instead of the listed URLs
    #[arg(long)]
    all_root: bool,

    /// Bucket to scan with --all-root (defaults to S3_BUCKET_NAME)
    #[arg(long, requires = "all_root")]
    bucket: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let config = Config::from_env(0)?;
    let storage = create_storage(&config.storage).await?;
    let engine = RelocationEngine::new(storage, config.default_bucket());

    let organized = if args.all_root {
        engine
            .organize_all_root_objects(&args.execution_folder, args.bucket.as_deref())
            .await
    } else {
        engine
            .organize_list(&args.execution_folder, &args.file_urls)
            .await
    };

    println!("\n{}", format_report(&organized));

    Ok(())
}

fn non_blank(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("execution_folder must be a non-empty string".to_string());
    }
    Ok(value.to_string())
}
