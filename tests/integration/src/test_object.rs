//! Object operation integration tests.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use storekit_core::{DEFAULT_URL_EXPIRATION_SECS, ObjectError, ObjectStorage, ObjectStorageError};
    use storekit_testing::{ObjectFixture, download_and_check, populate_storage, upload_file};

    use crate::{cleanup_bucket, create_test_bucket, http_client, open_storage, test_bucket_name};

    /// Create a bucket holding one object and return the fixture.
    async fn existing_object(
        storage: &storekit_s3::S3ObjectStorage,
        prefix: &str,
        size: usize,
    ) -> ObjectFixture {
        let fixture = ObjectFixture::with_size(test_bucket_name(prefix), "existing.bin", size);
        populate_storage(storage, &http_client(), &[], std::slice::from_ref(&fixture))
            .await
            .expect("populate_storage");
        fixture
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_upload_and_download_via_presigned_urls() {
        let storage = open_storage().await;
        let client = http_client();
        let bucket = create_test_bucket(&storage, "roundtrip").await;
        let fixture = ObjectFixture::with_size(bucket.clone(), "mytestfile", 64 * 1024);

        let post = storage
            .get_object_upload_url(&bucket, &fixture.object_id, DEFAULT_URL_EXPIRATION_SECS, None)
            .await
            .expect("get_object_upload_url");
        assert!(post.url.ends_with(&bucket), "unexpected POST url {}", post.url);
        upload_file(&client, &post, fixture.content.clone())
            .await
            .expect("upload_file");

        let url = storage
            .get_object_download_url(&bucket, &fixture.object_id, DEFAULT_URL_EXPIRATION_SECS)
            .await
            .expect("get_object_download_url");
        download_and_check(&client, &url, &fixture.md5)
            .await
            .expect("download_and_check");

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_check_object_existence_with_checksum() {
        let storage = open_storage().await;
        let fixture = existing_object(&storage, "md5", 512).await;
        let (bucket, object) = (&fixture.bucket_id, &fixture.object_id);

        assert!(storage.does_object_exist(bucket, object, None).await.expect("exists"));
        assert!(
            storage
                .does_object_exist(bucket, object, Some(&fixture.md5))
                .await
                .expect("exists with md5")
        );
        assert!(
            !storage
                .does_object_exist(bucket, object, Some("d41d8cd98f00b204e9800998ecf8427e"))
                .await
                .expect("exists with wrong md5")
        );
        assert!(
            !storage
                .does_object_exist(bucket, "missing.bin", None)
                .await
                .expect("missing")
        );

        cleanup_bucket(bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_object_size() {
        let storage = open_storage().await;
        let fixture = existing_object(&storage, "size", 1234).await;

        let size = storage
            .get_object_size(&fixture.bucket_id, &fixture.object_id)
            .await
            .expect("get_object_size");
        assert_eq!(size, 1234);

        cleanup_bucket(&fixture.bucket_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_upload_url_for_existing_object() {
        let storage = open_storage().await;
        let fixture = existing_object(&storage, "exists", 16).await;

        let err = storage
            .get_object_upload_url(
                &fixture.bucket_id,
                &fixture.object_id,
                DEFAULT_URL_EXPIRATION_SECS,
                None,
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, ObjectStorageError::Object(ObjectError::AlreadyExists { .. })),
            "unexpected error: {err}"
        );

        cleanup_bucket(&fixture.bucket_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_enforce_max_upload_size() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "limit").await;

        let post = storage
            .get_object_upload_url(&bucket, "limited.bin", DEFAULT_URL_EXPIRATION_SECS, Some(10))
            .await
            .expect("get_object_upload_url");
        let result = upload_file(&http_client(), &post, Bytes::from(vec![0u8; 100])).await;
        assert!(result.is_err(), "upload above the limit should be rejected");

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_download_url_for_missing_object() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "nokey").await;

        let err = storage
            .get_object_download_url(&bucket, "missing.bin", DEFAULT_URL_EXPIRATION_SECS)
            .await
            .unwrap_err();
        assert!(err.is_object_not_found(), "unexpected error: {err}");

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_object_between_buckets() {
        let storage = open_storage().await;
        let fixture = existing_object(&storage, "copysrc", 2048).await;
        let dest_bucket = create_test_bucket(&storage, "copydst").await;

        storage
            .copy_object(
                &fixture.bucket_id,
                &fixture.object_id,
                &dest_bucket,
                "copied.bin",
            )
            .await
            .expect("copy_object");

        assert!(
            storage
                .does_object_exist(&dest_bucket, "copied.bin", Some(&fixture.md5))
                .await
                .expect("exists")
        );
        assert!(
            storage
                .does_object_exist(&fixture.bucket_id, &fixture.object_id, None)
                .await
                .expect("source exists")
        );

        let err = storage
            .copy_object(
                &fixture.bucket_id,
                &fixture.object_id,
                &dest_bucket,
                "copied.bin",
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, ObjectStorageError::Object(ObjectError::AlreadyExists { .. })),
            "unexpected error: {err}"
        );

        cleanup_bucket(&fixture.bucket_id).await;
        cleanup_bucket(&dest_bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_copy_of_missing_source() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "nosrc").await;

        let err = storage
            .copy_object(&bucket, "missing.bin", &bucket, "target.bin")
            .await
            .unwrap_err();
        assert!(err.is_object_not_found(), "unexpected error: {err}");

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_object() {
        let storage = open_storage().await;
        let fixture = existing_object(&storage, "delete", 64).await;

        storage
            .delete_object(&fixture.bucket_id, &fixture.object_id)
            .await
            .expect("delete_object");
        assert!(
            !storage
                .does_object_exist(&fixture.bucket_id, &fixture.object_id, None)
                .await
                .expect("exists")
        );

        let err = storage
            .delete_object(&fixture.bucket_id, &fixture.object_id)
            .await
            .unwrap_err();
        assert!(err.is_object_not_found(), "unexpected error: {err}");

        cleanup_bucket(&fixture.bucket_id).await;
    }
}
