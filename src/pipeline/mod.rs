//! The release pipeline
//!
//! One strictly sequential run: exchange credentials, restore caches, build
//! the image under both tags, publish, persist the layer cache, tag the
//! revision. The first fatal error aborts every remaining stage; the only
//! non-fatal outcomes are a cache miss and a failed cache save.

pub mod context;

pub use context::{PipelineContext, RunInputs, REGION_VAR, RUN_NUMBER_VAR};

use crate::cache::{CacheDomain, CacheStore, Restored};
use crate::creds::{AccountKeys, CredentialExchange};
use crate::engine::{BuildRequest, ContainerEngine};
use crate::error::{SlipwayError, SlipwayResult};
use crate::repo::RevisionStore;
use crate::version::Version;
use std::path::PathBuf;
use tracing::{info, warn};

/// Per-domain restore outcome, kept for the final report
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub domain: CacheDomain,
    pub key: String,
    pub hit: bool,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub version: Version,
    pub digest: String,
    pub tags: [String; 2],
    pub cache: Vec<CacheOutcome>,
    pub layer_cache_saved: bool,
    pub revision_tag: Option<String>,
}

/// The release pipeline over its external collaborators
pub struct ReleasePipeline<'a> {
    exchange: &'a dyn CredentialExchange,
    engine: &'a dyn ContainerEngine,
    store: &'a CacheStore,
    revisions: &'a dyn RevisionStore,
}

impl<'a> ReleasePipeline<'a> {
    pub fn new(
        exchange: &'a dyn CredentialExchange,
        engine: &'a dyn ContainerEngine,
        store: &'a CacheStore,
        revisions: &'a dyn RevisionStore,
    ) -> Self {
        Self {
            exchange,
            engine,
            store,
            revisions,
        }
    }

    /// Run every stage in order, aborting on the first fatal error.
    ///
    /// `progress` receives a short description as each stage begins.
    pub async fn execute(
        &self,
        ctx: &PipelineContext,
        keys: &AccountKeys,
        progress: &(dyn Fn(&str) + Send + Sync),
    ) -> SlipwayResult<ReleaseReport> {
        // Credentials are needed at both ends of the run; a bad key pair
        // fails here, before any cache or build work.
        progress("Exchanging registry credentials");
        let credential = self
            .exchange
            .exchange(keys, &ctx.region, &ctx.endpoint)
            .await?;
        info!(
            "Credential for {} valid until {}",
            credential.endpoint, credential.expires_at
        );

        progress("Restoring build caches");
        let mut outcomes = Vec::new();
        let mut cache_from: Vec<PathBuf> = Vec::new();
        for domain_key in &ctx.keys {
            let restored = self.store.restore(domain_key.domain, &domain_key.key);
            if let Restored::Hit(entry) = &restored {
                cache_from.push(entry.path.clone());
            }
            outcomes.push(CacheOutcome {
                domain: domain_key.domain,
                key: domain_key.key.to_string(),
                hit: restored.is_hit(),
            });
        }

        progress("Building image");
        let tags = ctx.image_tags();
        let staging = self.store.staging_path(CacheDomain::Layer);
        let request = BuildRequest {
            file: ctx.build_file.clone(),
            context: ctx.build_context.clone(),
            platform: ctx.platform.clone(),
            tags: tags.clone(),
            cache_from,
            cache_to: Some(staging.clone()),
        };
        let digest = self.engine.build(&request).await?;

        // Both tags must name the exact image that was just built
        let latest_digest = self.engine.resolve_digest(&tags[0]).await?;
        let version_digest = self.engine.resolve_digest(&tags[1]).await?;
        if latest_digest != version_digest {
            return Err(SlipwayError::DigestMismatch {
                latest: latest_digest.as_str().to_string(),
                versioned: version_digest.as_str().to_string(),
            });
        }

        progress("Publishing tags");
        self.engine.login(&credential).await?;
        for tag in &tags {
            self.engine.push(tag).await?;
        }

        progress("Persisting layer cache");
        let layer = ctx.layer_key();
        let layer_cache_saved =
            match self.store.save(CacheDomain::Layer, &layer.key, &staging) {
                Ok(()) => true,
                Err(e) => {
                    // The image is already published; the next run just
                    // rebuilds without the cache.
                    warn!("Layer cache not persisted: {}", e);
                    false
                }
            };

        let revision_tag = if ctx.skip_tag {
            info!("Revision tagging skipped");
            None
        } else {
            progress("Tagging revision");
            let name = ctx.version.as_str();
            let head = self.revisions.head_commit().await?;
            if self.revisions.tag_exists(name).await? {
                return Err(SlipwayError::TagConflict(name.to_string()));
            }
            self.revisions.create_tag(name, &head).await?;
            self.revisions.push_tag(name).await?;
            info!("Tagged revision {} as {}", head, name);
            Some(name.to_string())
        };

        Ok(ReleaseReport {
            version: ctx.version.clone(),
            digest: digest.as_str().to_string(),
            tags: [tags[0].reference(), tags[1].reference()],
            cache: outcomes,
            layer_cache_saved,
            revision_tag,
        })
    }
}
