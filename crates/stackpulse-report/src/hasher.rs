//! Repository-level facts derived from commit authors.

use stackpulse_core::{Author, Fact, FactCode, Repo, StackpulseError};
use stackpulse_identity::IdentityResolver;

use crate::api::FactsApi;

/// Facts describing `authors` of `repo`: a single `TEAM_SIZE` fact with weight 0.
///
/// # Examples
///
/// ```
/// use stackpulse_core::{Author, Repo};
/// use stackpulse_identity::IdentityResolver;
/// use stackpulse_report::hasher::team_size_facts;
///
/// let authors = [Author::new("Ada", "ada@x.com"), Author::new("Ada L", "ada@y.org")];
/// let facts = team_size_facts(&Repo::new("r1"), &IdentityResolver::default(), &authors);
/// assert_eq!(facts[0].value, "1");
/// ```
pub fn team_size_facts(repo: &Repo, resolver: &IdentityResolver, authors: &[Author]) -> Vec<Fact> {
    let team_size = resolver.team_size(authors);
    vec![Fact::new(
        repo.clone(),
        FactCode::TeamSize,
        0,
        team_size.to_string(),
    )]
}

/// Computes author facts for one repository and reports them.
pub struct MetaHasher<A> {
    repo: Repo,
    api: A,
    resolver: IdentityResolver,
}

impl<A: FactsApi> MetaHasher<A> {
    pub fn new(repo: Repo, api: A, resolver: IdentityResolver) -> Self {
        Self {
            repo,
            api,
            resolver,
        }
    }

    /// The reporting client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Facts describing `authors`; see [`team_size_facts`].
    pub fn build_facts(&self, authors: &[Author]) -> Vec<Fact> {
        team_size_facts(&self.repo, &self.resolver, authors)
    }

    /// Build the facts for `authors` and post them.
    ///
    /// Nothing is posted for an empty author set. The built facts are
    /// returned either way.
    ///
    /// # Errors
    ///
    /// Propagates the reporting client's error; there is no retry.
    pub async fn calculate_and_send_facts(
        &self,
        authors: &[Author],
    ) -> Result<Vec<Fact>, StackpulseError> {
        let facts = self.build_facts(authors);
        if authors.is_empty() {
            tracing::debug!(repo = %self.repo.id, "no authors, skipping fact upload");
            return Ok(facts);
        }
        self.post_facts_to_server(&facts).await?;
        Ok(facts)
    }

    /// Post `facts` as one batch; an empty batch is not sent.
    ///
    /// # Errors
    ///
    /// Propagates the reporting client's error.
    pub async fn post_facts_to_server(&self, facts: &[Fact]) -> Result<(), StackpulseError> {
        if facts.is_empty() {
            return Ok(());
        }
        self.api.post_facts(facts).await?;
        tracing::info!(repo = %self.repo.id, count = facts.len(), "sent facts to server");
        Ok(())
    }
}
