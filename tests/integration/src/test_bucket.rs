//! Bucket operation integration tests.

#[cfg(test)]
mod tests {
    use storekit_core::{BucketError, ObjectStorage, ObjectStorageError};
    use storekit_testing::{ObjectFixture, populate_storage};

    use crate::{cleanup_bucket, create_test_bucket, http_client, open_storage, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_find_bucket() {
        let storage = open_storage().await;
        let bucket = test_bucket_name("create");

        assert!(!storage.does_bucket_exist(&bucket).await.expect("exists"));
        storage.create_bucket(&bucket).await.expect("create_bucket");
        assert!(storage.does_bucket_exist(&bucket).await.expect("exists"));

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_creating_bucket_twice() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "twice").await;

        let err = storage.create_bucket(&bucket).await.unwrap_err();
        assert!(
            matches!(err, ObjectStorageError::Bucket(BucketError::AlreadyExists { .. })),
            "unexpected error: {err}"
        );

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_deleting_unknown_bucket() {
        let storage = open_storage().await;
        let bucket = test_bucket_name("ghost");

        let err = storage.delete_bucket(&bucket, false).await.unwrap_err();
        assert!(err.is_bucket_not_found(), "unexpected error: {err}");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_empty_bucket() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "empty").await;

        storage.delete_bucket(&bucket, false).await.expect("delete_bucket");
        assert!(!storage.does_bucket_exist(&bucket).await.expect("exists"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_deleting_non_empty_bucket_without_content_flag() {
        let storage = open_storage().await;
        let bucket = test_bucket_name("full");
        let fixture = ObjectFixture::with_size(bucket.clone(), "payload.bin", 256);
        populate_storage(&storage, &http_client(), &[], &[fixture])
            .await
            .expect("populate_storage");

        let err = storage.delete_bucket(&bucket, false).await.unwrap_err();
        assert!(
            matches!(err, ObjectStorageError::Bucket(_)),
            "unexpected error: {err}"
        );
        assert!(storage.does_bucket_exist(&bucket).await.expect("exists"));

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_bucket_with_content() {
        let storage = open_storage().await;
        let bucket = test_bucket_name("purge");
        let fixtures = vec![
            ObjectFixture::with_size(bucket.clone(), "first.bin", 128),
            ObjectFixture::with_size(bucket.clone(), "second.bin", 256),
        ];
        populate_storage(&storage, &http_client(), &[], &fixtures)
            .await
            .expect("populate_storage");

        storage.delete_bucket(&bucket, true).await.expect("delete_bucket");
        assert!(!storage.does_bucket_exist(&bucket).await.expect("exists"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_all_object_ids() {
        let storage = open_storage().await;
        let bucket = test_bucket_name("list");
        let fixtures = vec![
            ObjectFixture::with_size(bucket.clone(), "a.txt", 10),
            ObjectFixture::with_size(bucket.clone(), "b.txt", 20),
            ObjectFixture::with_size(bucket.clone(), "c.txt", 30),
        ];
        populate_storage(&storage, &http_client(), &[], &fixtures)
            .await
            .expect("populate_storage");

        let mut object_ids = storage.list_all_object_ids(&bucket).await.expect("list");
        object_ids.sort();
        assert_eq!(object_ids, vec!["a.txt", "b.txt", "c.txt"]);

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_invalid_bucket_ids_locally() {
        let storage = open_storage().await;

        for bucket in ["ab", "MyBucket", "my_bucket", "my.bucket", "-bucket", "bucket-"] {
            let err = storage.create_bucket(bucket).await.unwrap_err();
            assert!(
                matches!(err, ObjectStorageError::Validation(_)),
                "{bucket}: unexpected error: {err}"
            );
        }
    }
}
