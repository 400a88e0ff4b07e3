//! Default fixture set integration tests.

#[cfg(test)]
mod tests {
    use storekit_core::ObjectStorage;
    use storekit_testing::FixtureSet;

    use crate::{cleanup_bucket, http_client, open_storage, unique_suffix};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_populate_default_fixture_set() {
        let storage = open_storage().await;
        let fixtures = FixtureSet::scoped(&unique_suffix());

        fixtures
            .populate(&storage, &http_client())
            .await
            .expect("populate");

        for bucket_id in &fixtures.existing_buckets {
            assert!(storage.does_bucket_exist(bucket_id).await.expect("exists"));
        }
        for bucket_id in &fixtures.non_existing_buckets {
            assert!(!storage.does_bucket_exist(bucket_id).await.expect("exists"));
        }
        for fixture in &fixtures.existing_objects {
            assert!(
                storage
                    .does_object_exist(&fixture.bucket_id, &fixture.object_id, Some(&fixture.md5))
                    .await
                    .expect("exists"),
                "{} should exist",
                fixture.object_id
            );
        }
        for fixture in &fixtures.non_existing_objects {
            assert!(
                !storage
                    .does_object_exist(&fixture.bucket_id, &fixture.object_id, None)
                    .await
                    .expect("exists"),
                "{} should not exist",
                fixture.object_id
            );
        }

        for bucket_id in &fixtures.existing_buckets {
            cleanup_bucket(bucket_id).await;
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_refuse_overlapping_fixture_set() {
        let storage = open_storage().await;
        let mut fixtures = FixtureSet::scoped(&unique_suffix());
        fixtures
            .non_existing_buckets
            .push(fixtures.existing_buckets[0].clone());

        assert!(fixtures.populate(&storage, &http_client()).await.is_err());
        assert!(
            !storage
                .does_bucket_exist(&fixtures.existing_buckets[0])
                .await
                .expect("exists")
        );
    }
}
