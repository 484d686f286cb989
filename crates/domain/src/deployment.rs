use std::str::FromStr;

use chrono::{DateTime, Utc};
use nimbus_core::{AppError, AppResult, Guid, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::MetadataEntry;

/// Lifecycle state of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentState {
    /// New instances are being rolled out.
    Deploying,
    /// Rollout finished.
    Deployed,
    /// Rollout is being reverted.
    Canceling,
    /// Rollout was reverted.
    Canceled,
}

impl DeploymentState {
    /// Returns a stable storage value for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploying => "DEPLOYING",
            Self::Deployed => "DEPLOYED",
            Self::Canceling => "CANCELING",
            Self::Canceled => "CANCELED",
        }
    }
}

impl FromStr for DeploymentState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DEPLOYING" => Ok(Self::Deploying),
            "DEPLOYED" => Ok(Self::Deployed),
            "CANCELING" => Ok(Self::Canceling),
            "CANCELED" => Ok(Self::Canceled),
            _ => Err(AppError::Validation(format!(
                "unknown deployment state '{value}'"
            ))),
        }
    }
}

/// Coarse status value of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatusValue {
    /// Deployment is still in progress.
    Active,
    /// Deployment reached a terminal outcome.
    Finalized,
}

impl DeploymentStatusValue {
    /// Returns a stable storage value for this status value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Finalized => "FINALIZED",
        }
    }
}

impl FromStr for DeploymentStatusValue {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "FINALIZED" => Ok(Self::Finalized),
            _ => Err(AppError::Validation(format!(
                "unknown deployment status value '{value}'"
            ))),
        }
    }
}

/// Reason qualifying a deployment status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatusReason {
    /// Instances are being replaced.
    Deploying,
    /// Instances are being rolled back.
    Canceling,
    /// All instances replaced.
    Deployed,
    /// Rollback finished.
    Canceled,
    /// A newer deployment took over.
    Superseded,
    /// The app had no instances to replace.
    Degenerate,
}

impl DeploymentStatusReason {
    /// Returns a stable storage value for this reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploying => "DEPLOYING",
            Self::Canceling => "CANCELING",
            Self::Deployed => "DEPLOYED",
            Self::Canceled => "CANCELED",
            Self::Superseded => "SUPERSEDED",
            Self::Degenerate => "DEGENERATE",
        }
    }

    /// Returns whether this reason may accompany the given status value.
    #[must_use]
    pub fn is_compatible_with(&self, value: DeploymentStatusValue) -> bool {
        match value {
            DeploymentStatusValue::Active => matches!(self, Self::Deploying | Self::Canceling),
            DeploymentStatusValue::Finalized => matches!(
                self,
                Self::Deployed | Self::Canceled | Self::Superseded | Self::Degenerate
            ),
        }
    }
}

impl FromStr for DeploymentStatusReason {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DEPLOYING" => Ok(Self::Deploying),
            "CANCELING" => Ok(Self::Canceling),
            "DEPLOYED" => Ok(Self::Deployed),
            "CANCELED" => Ok(Self::Canceled),
            "SUPERSEDED" => Ok(Self::Superseded),
            "DEGENERATE" => Ok(Self::Degenerate),
            _ => Err(AppError::Validation(format!(
                "unknown deployment status reason '{value}'"
            ))),
        }
    }
}

/// Rollout strategy of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStrategy {
    /// Replace instances one batch at a time.
    Rolling,
    /// Route a slice of traffic to one new instance before continuing.
    Canary,
}

impl DeploymentStrategy {
    /// Returns a stable storage value for this strategy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rolling => "rolling",
            Self::Canary => "canary",
        }
    }
}

impl FromStr for DeploymentStrategy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "rolling" => Ok(Self::Rolling),
            "canary" => Ok(Self::Canary),
            _ => Err(AppError::Validation(format!(
                "unknown deployment strategy '{value}'"
            ))),
        }
    }
}

/// Versioned revision reference carried by a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionReference {
    guid: Guid,
    version: i32,
}

impl RevisionReference {
    /// Creates a revision reference.
    pub fn new(guid: Guid, version: i32) -> AppResult<Self> {
        if version < 1 {
            return Err(AppError::Validation(
                "revision version must be at least 1".to_owned(),
            ));
        }

        Ok(Self { guid, version })
    }

    /// Returns the revision guid.
    #[must_use]
    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Returns the revision version number.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }
}

/// Append-only link between a deployment and a process it created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRelatedProcess {
    deployment_guid: Guid,
    process_guid: Guid,
    process_type: NonEmptyString,
}

impl HistoricalRelatedProcess {
    /// Creates a validated association row.
    pub fn new(
        deployment_guid: Guid,
        process_guid: Guid,
        process_type: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            deployment_guid,
            process_guid,
            process_type: NonEmptyString::new(process_type)?,
        })
    }

    /// Returns the owning deployment guid.
    #[must_use]
    pub fn deployment_guid(&self) -> &Guid {
        &self.deployment_guid
    }

    /// Returns the related process guid.
    #[must_use]
    pub fn process_guid(&self) -> &Guid {
        &self.process_guid
    }

    /// Returns the related process type, e.g. `web`.
    #[must_use]
    pub fn process_type(&self) -> &str {
        self.process_type.as_str()
    }
}

/// Unvalidated deployment attributes used to build a [`Deployment`].
#[derive(Debug, Clone)]
pub struct DeploymentInput {
    /// Deployment guid.
    pub guid: Guid,
    /// Lifecycle state.
    pub state: DeploymentState,
    /// Status value.
    pub status_value: DeploymentStatusValue,
    /// Status reason.
    pub status_reason: DeploymentStatusReason,
    /// Last time every new instance reported healthy.
    pub last_healthy_at: Option<DateTime<Utc>>,
    /// Rollout strategy.
    pub strategy: DeploymentStrategy,
    /// Owning app guid.
    pub app_guid: Guid,
    /// Droplet being rolled out.
    pub droplet_guid: Option<Guid>,
    /// Droplet that was current before the rollout.
    pub previous_droplet_guid: Option<Guid>,
    /// Revision being rolled out, if the app tracks revisions.
    pub revision: Option<RevisionReference>,
    /// Label rows.
    pub labels: Vec<MetadataEntry>,
    /// Annotation rows.
    pub annotations: Vec<MetadataEntry>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Rollout of a droplet or revision to an app's processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    guid: Guid,
    state: DeploymentState,
    status_value: DeploymentStatusValue,
    status_reason: DeploymentStatusReason,
    last_healthy_at: Option<DateTime<Utc>>,
    strategy: DeploymentStrategy,
    app_guid: Guid,
    droplet_guid: Option<Guid>,
    previous_droplet_guid: Option<Guid>,
    revision: Option<RevisionReference>,
    labels: Vec<MetadataEntry>,
    annotations: Vec<MetadataEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Deployment {
    /// Creates a validated deployment.
    pub fn new(input: DeploymentInput) -> AppResult<Self> {
        if !input.status_reason.is_compatible_with(input.status_value) {
            return Err(AppError::Validation(format!(
                "deployment status reason '{}' is not valid for status value '{}'",
                input.status_reason.as_str(),
                input.status_value.as_str()
            )));
        }

        if input.updated_at < input.created_at {
            return Err(AppError::Validation(
                "deployment updated_at must not precede created_at".to_owned(),
            ));
        }

        Ok(Self {
            guid: input.guid,
            state: input.state,
            status_value: input.status_value,
            status_reason: input.status_reason,
            last_healthy_at: input.last_healthy_at,
            strategy: input.strategy,
            app_guid: input.app_guid,
            droplet_guid: input.droplet_guid,
            previous_droplet_guid: input.previous_droplet_guid,
            revision: input.revision,
            labels: input.labels,
            annotations: input.annotations,
            created_at: input.created_at,
            updated_at: input.updated_at,
        })
    }

    /// Returns the deployment guid.
    #[must_use]
    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> DeploymentState {
        self.state
    }

    /// Returns the status value.
    #[must_use]
    pub fn status_value(&self) -> DeploymentStatusValue {
        self.status_value
    }

    /// Returns the status reason.
    #[must_use]
    pub fn status_reason(&self) -> DeploymentStatusReason {
        self.status_reason
    }

    /// Returns the last time the new instances were all healthy.
    #[must_use]
    pub fn last_healthy_at(&self) -> Option<DateTime<Utc>> {
        self.last_healthy_at
    }

    /// Returns the rollout strategy.
    #[must_use]
    pub fn strategy(&self) -> DeploymentStrategy {
        self.strategy
    }

    /// Returns the owning app guid.
    #[must_use]
    pub fn app_guid(&self) -> &Guid {
        &self.app_guid
    }

    /// Returns the droplet being rolled out.
    #[must_use]
    pub fn droplet_guid(&self) -> Option<&Guid> {
        self.droplet_guid.as_ref()
    }

    /// Returns the droplet that was current before the rollout.
    #[must_use]
    pub fn previous_droplet_guid(&self) -> Option<&Guid> {
        self.previous_droplet_guid.as_ref()
    }

    /// Returns the stored revision reference, regardless of app settings.
    #[must_use]
    pub fn revision(&self) -> Option<&RevisionReference> {
        self.revision.as_ref()
    }

    /// Returns label rows in stored order.
    #[must_use]
    pub fn labels(&self) -> &[MetadataEntry] {
        &self.labels
    }

    /// Returns annotation rows in stored order.
    #[must_use]
    pub fn annotations(&self) -> &[MetadataEntry] {
        &self.annotations
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
