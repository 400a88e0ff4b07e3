//! Bucket and object fixtures.

use bytes::Bytes;
use md5::{Digest, Md5};
use storekit_core::{DEFAULT_URL_EXPIRATION_SECS, ObjectStorage};

use crate::transfer::upload_file;

/// Buckets created by [`FixtureSet::populate`] in the default fixture set.
pub const DEFAULT_EXISTING_BUCKETS: [&str; 2] = ["myexistingtestbucket100", "myexistingtestbucket200"];

/// Buckets guaranteed not to exist in the default fixture set.
pub const DEFAULT_NON_EXISTING_BUCKETS: [&str; 2] =
    ["mynonexistingtestbucket100", "mynonexistingtestbucket200"];

/// Compute the hex MD5 checksum of `content`.
///
/// # Examples
///
/// ```
/// use storekit_testing::fixtures::calc_md5;
///
/// assert_eq!(calc_md5(b""), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
#[must_use]
pub fn calc_md5(content: &[u8]) -> String {
    hex::encode(Md5::digest(content))
}

/// An object with known content, to be placed in (or kept out of) storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFixture {
    /// The bucket holding the object.
    pub bucket_id: String,
    /// The object id.
    pub object_id: String,
    /// The object content.
    pub content: Bytes,
    /// Hex MD5 checksum of `content`.
    pub md5: String,
}

impl ObjectFixture {
    /// Create a fixture, computing the checksum of `content`.
    #[must_use]
    pub fn new(bucket_id: impl Into<String>, object_id: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            bucket_id: bucket_id.into(),
            object_id: object_id.into(),
            md5: calc_md5(&content),
            content,
        }
    }

    /// Create a fixture with `size` bytes of deterministic content.
    #[must_use]
    pub fn with_size(bucket_id: impl Into<String>, object_id: impl Into<String>, size: usize) -> Self {
        let object_id = object_id.into();
        let pattern = format!("content of {object_id}\n");
        let content: Vec<u8> = pattern.bytes().cycle().take(size).collect();
        Self::new(bucket_id, object_id, content)
    }
}

/// Buckets and objects a test starts from.
///
/// Existing buckets and objects are created by [`FixtureSet::populate`]. The
/// non-existing ones are guaranteed to be absent afterwards. Non-existing
/// objects live in existing buckets so that their absence is checked at the
/// object level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    /// Buckets created by `populate`.
    pub existing_buckets: Vec<String>,
    /// Buckets that must not exist.
    pub non_existing_buckets: Vec<String>,
    /// Objects uploaded by `populate`.
    pub existing_objects: Vec<ObjectFixture>,
    /// Objects that must not exist.
    pub non_existing_objects: Vec<ObjectFixture>,
}

impl FixtureSet {
    /// The default fixture set with `-{suffix}` appended to every bucket id,
    /// so that concurrent runs against one server do not collide.
    #[must_use]
    pub fn scoped(suffix: &str) -> Self {
        let scope = |bucket_id: &&str| {
            if suffix.is_empty() {
                (*bucket_id).to_owned()
            } else {
                format!("{bucket_id}-{suffix}")
            }
        };
        let existing_buckets: Vec<String> = DEFAULT_EXISTING_BUCKETS.iter().map(scope).collect();
        let non_existing_buckets = DEFAULT_NON_EXISTING_BUCKETS.iter().map(scope).collect();

        let objects = |name: &str, unit: usize| -> Vec<ObjectFixture> {
            existing_buckets
                .iter()
                .enumerate()
                .map(|(idx, bucket_id)| {
                    ObjectFixture::with_size(
                        bucket_id.clone(),
                        format!("{name}{idx}"),
                        unit * (idx + 1),
                    )
                })
                .collect()
        };
        let existing_objects = objects("myexistingtestobject", 1024);
        let non_existing_objects = objects("mynonexistingtestobject", 2048);

        Self {
            existing_buckets,
            non_existing_buckets,
            existing_objects,
            non_existing_objects,
        }
    }

    /// Create the existing buckets and upload the existing objects.
    pub async fn populate(
        &self,
        storage: &dyn ObjectStorage,
        client: &reqwest::Client,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.existing_buckets
                .iter()
                .all(|bucket_id| !self.non_existing_buckets.contains(bucket_id)),
            "the existing and non-existing bucket lists may not overlap"
        );
        let bucket_ids: Vec<&str> = self.existing_buckets.iter().map(String::as_str).collect();
        populate_storage(storage, client, &bucket_ids, &self.existing_objects).await
    }
}

impl Default for FixtureSet {
    fn default() -> Self {
        Self::scoped("")
    }
}

/// Create the given buckets and upload the given objects.
///
/// Buckets of object fixtures are created on demand.
pub async fn populate_storage(
    storage: &dyn ObjectStorage,
    client: &reqwest::Client,
    bucket_fixtures: &[&str],
    object_fixtures: &[ObjectFixture],
) -> anyhow::Result<()> {
    for bucket_id in bucket_fixtures {
        storage.create_bucket(bucket_id).await?;
    }

    for fixture in object_fixtures {
        if !storage.does_bucket_exist(&fixture.bucket_id).await? {
            storage.create_bucket(&fixture.bucket_id).await?;
        }
        let post = storage
            .get_object_upload_url(
                &fixture.bucket_id,
                &fixture.object_id,
                DEFAULT_URL_EXPIRATION_SECS,
                None,
            )
            .await?;
        upload_file(client, &post, fixture.content.clone()).await?;
    }

    Ok(())
}
