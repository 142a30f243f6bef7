//! Read-only run context supplied by the automation platform.
//!
//! The context is captured once at process start and passed explicitly to
//! every component; nothing in this crate reads it as global state.

use std::fmt;

use crate::error::{Result, TrackerError};

/// Job status value the platform reports for a successful job.
pub const JOB_STATUS_SUCCESS: &str = "success";

/// Repository identity as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Self {
        RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse a `owner/name` slug such as the value of `GITHUB_REPOSITORY`.
    pub fn parse(slug: &str) -> Result<Self> {
        let mut parts = slug.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoRef::new(owner, name))
            }
            _ => Err(TrackerError::InvalidRepository(slug.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Ambient information about the job that triggered this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub repository: RepoRef,
    /// Commit that triggered the run
    pub sha: String,
    /// Job identifier
    pub job: String,
    /// Final job status, only known in the post step
    pub job_status: Option<String>,
}

impl RunContext {
    pub fn new(repository: RepoRef, sha: &str, job: &str) -> Self {
        RunContext {
            repository,
            sha: sha.to_string(),
            job: job.to_string(),
            job_status: None,
        }
    }

    /// Build the context from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the context from `GITHUB_REPOSITORY`, `GITHUB_SHA` and
    /// `GITHUB_JOB` as returned by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| TrackerError::MissingContext(key.to_string()))
        };

        let repository = RepoRef::parse(&required("GITHUB_REPOSITORY")?)?;
        let sha = required("GITHUB_SHA")?;
        let job = required("GITHUB_JOB")?;

        Ok(RunContext::new(repository, &sha, &job))
    }

    /// Attach the job's final status. Blank values are ignored.
    pub fn with_job_status(mut self, status: Option<&str>) -> Self {
        self.job_status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    /// True only when the recorded status is exactly `success`.
    pub fn job_succeeded(&self) -> bool {
        self.job_status.as_deref() == Some(JOB_STATUS_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repo_ref_parse() {
        let repo = RepoRef::parse("bananaops/checkout").unwrap();
        assert_eq!(repo.owner, "bananaops");
        assert_eq!(repo.name, "checkout");
        assert_eq!(repo.to_string(), "bananaops/checkout");
    }

    #[test]
    fn test_repo_ref_parse_rejects_bad_slugs() {
        for slug in ["", "checkout", "a/b/c", "/checkout", "owner/"] {
            assert!(
                matches!(
                    RepoRef::parse(slug),
                    Err(TrackerError::InvalidRepository(_))
                ),
                "slug {slug:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_lookup() {
        let env = vars(&[
            ("GITHUB_REPOSITORY", "bananaops/checkout"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_JOB", "deploy"),
        ]);
        let ctx = RunContext::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(ctx.repository.name, "checkout");
        assert_eq!(ctx.sha, "abc123");
        assert_eq!(ctx.job, "deploy");
        assert_eq!(ctx.job_status, None);
    }

    #[test]
    fn test_from_lookup_missing_sha() {
        let env = vars(&[
            ("GITHUB_REPOSITORY", "bananaops/checkout"),
            ("GITHUB_JOB", "deploy"),
        ]);
        let err = RunContext::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, TrackerError::MissingContext(ref k) if k == "GITHUB_SHA"));
    }

    #[test]
    fn test_job_succeeded() {
        let ctx = RunContext::new(RepoRef::new("o", "r"), "sha", "job");
        assert!(!ctx.job_succeeded());

        let ctx = ctx.with_job_status(Some("success"));
        assert!(ctx.job_succeeded());

        let ctx = ctx.with_job_status(Some("failure"));
        assert!(!ctx.job_succeeded());

        let ctx = ctx.with_job_status(Some("   "));
        assert_eq!(ctx.job_status, None);
    }
}
