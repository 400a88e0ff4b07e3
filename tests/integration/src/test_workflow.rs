//! End-to-end workflow integration tests.

#[cfg(test)]
mod tests {
    use storekit_core::ObjectStorage;
    use storekit_testing::{WorkflowOptions, cleanup_buckets_and_objects, typical_workflow};

    use crate::{cleanup_bucket, http_client, open_storage, test_bucket_name};

    async fn run_workflow(use_multipart_upload: bool) {
        let storage = open_storage().await;
        let options = WorkflowOptions::builder()
            .bucket1_id(test_bucket_name("wf1"))
            .bucket2_id(test_bucket_name("wf2"))
            .use_multipart_upload(use_multipart_upload)
            .build();
        let bucket_ids = [options.bucket1_id.as_str(), options.bucket2_id.as_str()];

        typical_workflow(&storage, &http_client(), &options)
            .await
            .expect("typical_workflow");

        cleanup_buckets_and_objects(&storage, &bucket_ids, &options.object_id)
            .await
            .expect("cleanup_buckets_and_objects");
        for bucket_id in bucket_ids {
            assert!(!storage.does_bucket_exist(bucket_id).await.expect("exists"));
            cleanup_bucket(bucket_id).await;
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_run_typical_workflow_with_multipart_upload() {
        run_workflow(true).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_run_typical_workflow_with_single_upload() {
        run_workflow(false).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_run_default_workflow_scenario() {
        let storage = open_storage().await;
        let client = http_client();
        let options = WorkflowOptions::default();
        let bucket_ids = [options.bucket1_id.as_str(), options.bucket2_id.as_str()];

        cleanup_buckets_and_objects(&storage, &bucket_ids, &options.object_id)
            .await
            .expect("cleanup before");
        typical_workflow(&storage, &client, &options)
            .await
            .expect("typical_workflow");
        cleanup_buckets_and_objects(&storage, &bucket_ids, &options.object_id)
            .await
            .expect("cleanup after");
    }
}
