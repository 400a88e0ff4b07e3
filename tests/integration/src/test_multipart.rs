//! Multipart upload integration tests.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use storekit_core::{
        DEFAULT_URL_EXPIRATION_SECS, MultiPartUploadError, ObjectStorage, ObjectStorageError,
    };
    use storekit_s3::S3ObjectStorage;
    use storekit_testing::{
        ObjectFixture, calc_md5, download_and_check, multipart_upload_file, upload_part,
    };

    use crate::{cleanup_bucket, create_test_bucket, http_client, open_storage, s3_client};

    const MIB: usize = 1024 * 1024;
    const OBJECT_ID: &str = "multipart.bin";

    /// Upload parts of the given sizes and return the concatenated content.
    async fn upload_parts_of_sizes(
        storage: &S3ObjectStorage,
        upload_id: &str,
        bucket: &str,
        sizes: &[usize],
    ) -> Vec<u8> {
        let client = http_client();
        let mut content = Vec::new();
        for (part_number, &size) in (1..).zip(sizes) {
            let part = vec![u8::try_from(part_number).unwrap_or(u8::MAX); size];
            let url = storage
                .get_part_upload_url(
                    upload_id,
                    bucket,
                    OBJECT_ID,
                    part_number,
                    DEFAULT_URL_EXPIRATION_SECS,
                )
                .await
                .expect("get_part_upload_url");
            upload_part(&client, &url, Bytes::from(part.clone()))
                .await
                .expect("upload_part");
            content.extend_from_slice(&part);
        }
        content
    }

    fn assert_confirm_rejected(err: &ObjectStorageError) {
        assert!(
            matches!(
                err,
                ObjectStorageError::MultiPartUpload(MultiPartUploadError::ConfirmRejected { .. })
            ),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_second_init_for_same_object() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "init").await;

        storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");
        let err = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                ObjectStorageError::MultiPartUpload(MultiPartUploadError::AlreadyExists { .. })
            ),
            "unexpected error: {err}"
        );

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_complete_upload_with_consistent_parts() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "complete").await;

        let upload_id = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");
        let content =
            upload_parts_of_sizes(&storage, &upload_id, &bucket, &[10 * MIB, 10 * MIB, MIB]).await;

        storage
            .complete_multipart_upload(&upload_id, &bucket, OBJECT_ID, Some(3), Some(10 * 1024 * 1024))
            .await
            .expect("complete_multipart_upload");

        let size = storage
            .get_object_size(&bucket, OBJECT_ID)
            .await
            .expect("get_object_size");
        assert_eq!(size, 21 * 1024 * 1024);

        let url = storage
            .get_object_download_url(&bucket, OBJECT_ID, DEFAULT_URL_EXPIRATION_SECS)
            .await
            .expect("get_object_download_url");
        download_and_check(&http_client(), &url, &calc_md5(&content))
            .await
            .expect("download_and_check");

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_completion_with_inconsistent_parts() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "inconsistent").await;

        let upload_id = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");
        upload_parts_of_sizes(&storage, &upload_id, &bucket, &[10 * MIB, 5 * MIB, MIB]).await;

        let err = storage
            .complete_multipart_upload(&upload_id, &bucket, OBJECT_ID, None, None)
            .await
            .unwrap_err();
        assert_confirm_rejected(&err);
        assert!(
            !storage
                .does_object_exist(&bucket, OBJECT_ID, None)
                .await
                .expect("exists")
        );

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_completion_without_parts() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "noparts").await;

        let upload_id = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");

        let err = storage
            .complete_multipart_upload(&upload_id, &bucket, OBJECT_ID, None, None)
            .await
            .unwrap_err();
        assert_confirm_rejected(&err);

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_completion_with_unexpected_part_quantity() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "quantity").await;

        let upload_id = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");
        upload_parts_of_sizes(&storage, &upload_id, &bucket, &[5 * MIB, MIB]).await;

        let err = storage
            .complete_multipart_upload(&upload_id, &bucket, OBJECT_ID, Some(3), None)
            .await
            .unwrap_err();
        assert_confirm_rejected(&err);

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_forget_upload_after_abort() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "abort").await;

        let upload_id = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");
        upload_parts_of_sizes(&storage, &upload_id, &bucket, &[MIB]).await;

        storage
            .abort_multipart_upload(&upload_id, &bucket, OBJECT_ID)
            .await
            .expect("abort_multipart_upload");

        let err = storage
            .get_part_upload_url(&upload_id, &bucket, OBJECT_ID, 1, DEFAULT_URL_EXPIRATION_SECS)
            .await
            .unwrap_err();
        assert!(err.is_upload_not_found(), "unexpected error: {err}");

        let err = storage
            .abort_multipart_upload(&upload_id, &bucket, OBJECT_ID)
            .await
            .unwrap_err();
        assert!(err.is_upload_not_found(), "unexpected error: {err}");

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_part_numbers_out_of_range() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "partnum").await;

        let upload_id = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");

        for part_number in [0, 10_001] {
            let err = storage
                .get_part_upload_url(
                    &upload_id,
                    &bucket,
                    OBJECT_ID,
                    part_number,
                    DEFAULT_URL_EXPIRATION_SECS,
                )
                .await
                .unwrap_err();
            assert!(
                matches!(err, ObjectStorageError::Validation(_)),
                "{part_number}: unexpected error: {err}"
            );
        }

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_detect_multiple_active_uploads() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "race").await;

        let upload_id = storage
            .init_multipart_upload(&bucket, OBJECT_ID)
            .await
            .expect("init_multipart_upload");
        // A competing upload started behind the port's back.
        let competing = s3_client()
            .create_multipart_upload()
            .bucket(&bucket)
            .key(OBJECT_ID)
            .send()
            .await
            .expect("create_multipart_upload");
        let competing_id = competing.upload_id().expect("upload_id").to_owned();

        let err = storage
            .get_part_upload_url(&upload_id, &bucket, OBJECT_ID, 1, DEFAULT_URL_EXPIRATION_SECS)
            .await
            .unwrap_err();
        match err {
            ObjectStorageError::MultiPartUpload(MultiPartUploadError::MultipleActive {
                upload_ids,
                ..
            }) => {
                assert!(upload_ids.contains(&upload_id));
                assert!(upload_ids.contains(&competing_id));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Abort does not require exclusivity.
        storage
            .abort_multipart_upload(&competing_id, &bucket, OBJECT_ID)
            .await
            .expect("abort competing upload");
        storage
            .get_part_upload_url(&upload_id, &bucket, OBJECT_ID, 1, DEFAULT_URL_EXPIRATION_SECS)
            .await
            .expect("get_part_upload_url after abort");

        cleanup_bucket(&bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_upload_file_in_parts() {
        let storage = open_storage().await;
        let bucket = create_test_bucket(&storage, "file").await;
        let fixture = ObjectFixture::with_size(bucket.clone(), OBJECT_ID, 12 * MIB + 7);

        multipart_upload_file(
            &storage,
            &http_client(),
            &bucket,
            OBJECT_ID,
            &fixture.content,
            5 * 1024 * 1024,
        )
        .await
        .expect("multipart_upload_file");

        assert!(
            storage
                .does_object_exist(&bucket, OBJECT_ID, None)
                .await
                .expect("exists")
        );
        let url = storage
            .get_object_download_url(&bucket, OBJECT_ID, DEFAULT_URL_EXPIRATION_SECS)
            .await
            .expect("get_object_download_url");
        download_and_check(&http_client(), &url, &fixture.md5)
            .await
            .expect("download_and_check");

        cleanup_bucket(&bucket).await;
    }
}
