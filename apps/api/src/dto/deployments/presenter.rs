use nimbus_core::{AppError, AppResult};
use nimbus_domain::{AppModel, Deployment, HistoricalRelatedProcess, hashify_entries};
use tracing::warn;

use super::types::{
    DeploymentLinksDto, DeploymentProcessDto, DeploymentRelationshipsDto, DeploymentResponse,
    DeploymentRevisionDto, DeploymentStatusDetailsDto, DeploymentStatusDto,
};
use crate::dto::common::{LinkDto, MetadataDto, NullableGuidDto, RelationshipDto, format_timestamp};
use crate::url_builder::ApiUrlBuilder;

/// Presents a deployment together with its owning app and historical processes.
///
/// The owning app must be present and match the deployment's app guid; a
/// dangling relation is an integrity failure and never renders as null.
pub fn present_deployment(
    deployment: &Deployment,
    app: Option<&AppModel>,
    historical_processes: &[HistoricalRelatedProcess],
    url_builder: &ApiUrlBuilder,
) -> AppResult<DeploymentResponse> {
    let app = match app {
        Some(app) if app.guid() == deployment.app_guid() => app,
        Some(app) => {
            warn!(
                deployment_guid = %deployment.guid(),
                expected_app_guid = %deployment.app_guid(),
                app_guid = %app.guid(),
                "deployment presented with a foreign app"
            );
            return Err(AppError::Internal(format!(
                "deployment '{}' belongs to app '{}', not '{}'",
                deployment.guid(),
                deployment.app_guid(),
                app.guid()
            )));
        }
        None => {
            warn!(
                deployment_guid = %deployment.guid(),
                app_guid = %deployment.app_guid(),
                "deployment presented without its app"
            );
            return Err(AppError::Internal(format!(
                "deployment '{}' references missing app '{}'",
                deployment.guid(),
                deployment.app_guid()
            )));
        }
    };

    let revision = deployment
        .revision()
        .filter(|_| app.revisions_enabled())
        .map(|revision| DeploymentRevisionDto {
            guid: revision.guid().as_str().to_owned(),
            version: revision.version(),
        });

    Ok(DeploymentResponse {
        guid: deployment.guid().as_str().to_owned(),
        state: deployment.state().as_str().to_owned(),
        status: DeploymentStatusDto {
            value: deployment.status_value().as_str().to_owned(),
            reason: deployment.status_reason().as_str().to_owned(),
            details: DeploymentStatusDetailsDto {
                last_successful_healthcheck: deployment.last_healthy_at().map(format_timestamp),
            },
        },
        strategy: deployment.strategy().as_str().to_owned(),
        droplet: NullableGuidDto::of(deployment.droplet_guid()),
        previous_droplet: NullableGuidDto::of(deployment.previous_droplet_guid()),
        new_processes: historical_processes
            .iter()
            .filter(|process| process.deployment_guid() == deployment.guid())
            .map(|process| DeploymentProcessDto {
                guid: process.process_guid().as_str().to_owned(),
                process_type: process.process_type().to_owned(),
            })
            .collect(),
        revision,
        created_at: format_timestamp(deployment.created_at()),
        updated_at: format_timestamp(deployment.updated_at()),
        relationships: DeploymentRelationshipsDto {
            app: RelationshipDto::to(app.guid()),
        },
        metadata: MetadataDto {
            labels: hashify_entries(deployment.labels()),
            annotations: hashify_entries(deployment.annotations()),
        },
        links: DeploymentLinksDto {
            self_link: LinkDto {
                href: url_builder.build_url(&format!("/v3/deployments/{}", deployment.guid())),
            },
            app: LinkDto {
                href: url_builder.build_url(&format!("/v3/apps/{}", app.guid())),
            },
        },
    })
}
