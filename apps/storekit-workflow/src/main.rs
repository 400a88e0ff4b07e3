//! StoreKit workflow check - exercises an S3-compatible endpoint.
//!
//! Creates `mytestbucket1`, uploads `mytestfile`, downloads and verifies it,
//! copies it to `mytestbucket2`, deletes the original and its bucket, and
//! downloads the copy. Buckets and objects left over from earlier runs are
//! removed before and after the workflow.
//!
//! # Usage
//!
//! ```text
//! S3_ENDPOINT_URL=http://localhost:4566 storekit-workflow [--single-upload]
//! ```
//!
//! `--single-upload` uploads through one presigned POST instead of the
//! multipart protocol.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `S3_ENDPOINT_URL` | `http://localhost:4566` | S3 API endpoint |
//! | `S3_ACCESS_KEY_ID` | `test` | Access key id |
//! | `S3_SECRET_ACCESS_KEY` | `test` | Secret access key |
//! | `S3_SESSION_TOKEN` | *(unset)* | Session token |
//! | `AWS_CONFIG_INI` | *(unset)* | AWS shared-config file with client settings |
//! | `WORKFLOW_BUCKET1_ID` | `mytestbucket1` | First bucket |
//! | `WORKFLOW_BUCKET2_ID` | `mytestbucket2` | Second bucket |
//! | `WORKFLOW_OBJECT_ID` | `mytestfile` | Object id |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use anyhow::{Context, Result};
use storekit_s3::{S3Config, S3ObjectStorage};
use storekit_testing::{WorkflowOptions, cleanup_buckets_and_objects, typical_workflow};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the workflow options from environment variables and flags.
fn workflow_options() -> WorkflowOptions {
    let defaults = WorkflowOptions::default();
    WorkflowOptions {
        bucket1_id: std::env::var("WORKFLOW_BUCKET1_ID").unwrap_or(defaults.bucket1_id),
        bucket2_id: std::env::var("WORKFLOW_BUCKET2_ID").unwrap_or(defaults.bucket2_id),
        object_id: std::env::var("WORKFLOW_OBJECT_ID").unwrap_or(defaults.object_id),
        use_multipart_upload: !std::env::args().any(|a| a == "--single-upload"),
        ..defaults
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = S3Config::from_env();

    init_tracing(&config.log_level)?;

    let options = workflow_options();
    info!(
        endpoint = %config.s3_endpoint_url,
        bucket1 = %options.bucket1_id,
        bucket2 = %options.bucket2_id,
        key = %options.object_id,
        use_multipart_upload = options.use_multipart_upload,
        "starting object storage workflow",
    );

    let storage = S3ObjectStorage::connect(config).await;
    let client = reqwest::Client::new();
    let bucket_ids = [options.bucket1_id.as_str(), options.bucket2_id.as_str()];

    cleanup_buckets_and_objects(&storage, &bucket_ids, &options.object_id)
        .await
        .context("failed to clean up before the workflow")?;
    typical_workflow(&storage, &client, &options)
        .await
        .context("object storage workflow failed")?;
    cleanup_buckets_and_objects(&storage, &bucket_ids, &options.object_id)
        .await
        .context("failed to clean up after the workflow")?;

    info!("object storage workflow succeeded");
    Ok(())
}
