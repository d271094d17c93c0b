//! Link creation and resolution service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{
    ExpiryPolicy, Link, NewLink, SlugCandidate, SlugOrigin,
};
use crate::domain::repositories::{LinkRepository, ProfileRepository};
use crate::error::AppError;
use crate::infrastructure::suggestion::SuggestionProvider;
use crate::utils::slug::{disambiguate, fallback_slug, validate_slug};
use crate::utils::url_check::parse_original_url;

/// Attempts against the store before creation gives up.
const MAX_CREATE_ATTEMPTS: usize = 5;

/// A created link together with where its slug came from.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub link: Link,
    pub origin: SlugOrigin,
}

/// Service for creating and resolving shortened links.
///
/// Slug selection is a pipeline: a custom slug is validated and used
/// verbatim; otherwise the suggestion collaborator is consulted under a
/// timeout, and the deterministic URL-derived fallback covers every failure
/// mode. Uniqueness is settled only by the store — on collision the slug is
/// re-disambiguated and retried.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    profiles: Arc<dyn ProfileRepository>,
    suggestions: Arc<dyn SuggestionProvider>,
    suggestion_timeout: Duration,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        profiles: Arc<dyn ProfileRepository>,
        suggestions: Arc<dyn SuggestionProvider>,
        suggestion_timeout: Duration,
    ) -> Self {
        Self {
            links,
            profiles,
            suggestions,
            suggestion_timeout,
        }
    }

    /// Creates a short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or a custom slug is
    /// invalid, [`AppError::Conflict`] if a custom slug is taken, and
    /// [`AppError::Exhausted`] if generated slugs keep colliding.
    pub async fn create_link(
        &self,
        original_url: &str,
        custom_slug: Option<String>,
        keywords: Vec<String>,
        owner_id: Option<String>,
        expiry: ExpiryPolicy,
    ) -> Result<CreatedLink, AppError> {
        let url = parse_original_url(original_url)?;

        // A custom slug is honored exactly or rejected; it is never mutated
        // to dodge a collision.
        if let Some(custom) = custom_slug {
            validate_slug(&custom)?;
            let link = self
                .links
                .create(NewLink {
                    slug: custom,
                    long_url: url.to_string(),
                    owner_id,
                    expiry,
                })
                .await?;
            return Ok(CreatedLink {
                link,
                origin: SlugOrigin::Custom,
            });
        }

        let candidate = self
            .pick_candidate(url.as_str(), owner_id.as_deref(), &keywords)
            .await;

        let mut slug = candidate.slug.clone();
        for attempt in 0..MAX_CREATE_ATTEMPTS {
            match self
                .links
                .create(NewLink {
                    slug: slug.clone(),
                    long_url: url.to_string(),
                    owner_id: owner_id.clone(),
                    expiry,
                })
                .await
            {
                Ok(link) => {
                    return Ok(CreatedLink {
                        link,
                        origin: candidate.origin.clone(),
                    });
                }
                Err(AppError::Conflict { .. }) => {
                    debug!(slug = %slug, attempt, "slug collision, disambiguating");
                    slug = disambiguate(&candidate.slug);
                }
                Err(other) => return Err(other),
            }
        }

        Err(AppError::exhausted(
            "Could not find a free slug",
            json!({ "base": candidate.slug, "attempts": MAX_CREATE_ATTEMPTS }),
        ))
    }

    /// Resolves a slug to an active link.
    ///
    /// Expired links are indistinguishable from missing ones: both come back
    /// as [`AppError::NotFound`], so the destination is never leaked past the
    /// click budget.
    pub async fn resolve(&self, slug: &str) -> Result<Link, AppError> {
        let link = self
            .links
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "slug": slug }))
            })?;

        if link.is_expired() {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "slug": slug }),
            ));
        }

        Ok(link)
    }

    /// Lists an owner's links, newest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Link>, AppError> {
        self.links.list_for_owner(owner_id).await
    }

    /// Total links an owner has created.
    pub async fn count_for_owner(&self, owner_id: &str) -> Result<i64, AppError> {
        self.links.count_for_owner(owner_id).await
    }

    /// Picks the best available slug candidate. Infallible: every failure
    /// path lands on the deterministic fallback.
    async fn pick_candidate(
        &self,
        url: &str,
        owner_id: Option<&str>,
        keywords: &[String],
    ) -> SlugCandidate {
        let profile = match owner_id {
            Some(owner) => self.profiles.get(owner).await.ok().flatten(),
            None => None,
        };

        let suggested = tokio::time::timeout(
            self.suggestion_timeout,
            self.suggestions.suggest(url, profile, keywords.to_vec()),
        )
        .await;

        match suggested {
            Ok(Ok(suggestions)) => {
                for suggestion in suggestions {
                    if validate_slug(&suggestion.slug).is_ok() {
                        return SlugCandidate {
                            slug: suggestion.slug,
                            origin: SlugOrigin::AiGenerated {
                                tier: suggestion.tier,
                                components: suggestion.components,
                            },
                        };
                    }
                    debug!(slug = %suggestion.slug, "discarding invalid suggestion");
                }
            }
            Ok(Err(e)) => {
                debug!(error = %e, "suggestion collaborator unavailable");
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.suggestion_timeout.as_millis() as u64,
                    "suggestion collaborator timed out"
                );
            }
        }

        match parse_original_url(url) {
            Ok(parsed) => SlugCandidate {
                slug: fallback_slug(&parsed, keywords),
                origin: SlugOrigin::Fallback,
            },
            // Unreachable in practice: the URL was parsed by the caller.
            Err(_) => SlugCandidate {
                slug: "link".to_string(),
                origin: SlugOrigin::Fallback,
            },
        }
    }
}
