use nimbus_domain::AppModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::dto::common::{LinkDto, NullableGuidDto, RelationshipDto};
use crate::url_builder::ApiUrlBuilder;

/// Incoming payload for app creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-app-request.ts"
)]
pub struct CreateAppRequest {
    pub name: String,
    pub relationships: AppRelationshipsDto,
    pub enable_ssh: Option<bool>,
    #[ts(type = "Record<string, unknown> | null")]
    pub environment_variables: Option<Value>,
}

/// Relationships of an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/app-relationships-dto.ts"
)]
pub struct AppRelationshipsDto {
    pub space: RelationshipDto,
}

/// Links of an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/app-links-dto.ts"
)]
pub struct AppLinksDto {
    #[serde(rename = "self")]
    pub self_link: LinkDto,
    pub space: LinkDto,
}

/// API representation of an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/app-response.ts"
)]
pub struct AppResponse {
    pub guid: String,
    pub name: String,
    pub enable_ssh: bool,
    pub revisions_enabled: bool,
    pub current_droplet: NullableGuidDto,
    pub relationships: AppRelationshipsDto,
    pub links: AppLinksDto,
}

impl AppResponse {
    pub fn present(app: &AppModel, url_builder: &ApiUrlBuilder) -> Self {
        Self {
            guid: app.guid().as_str().to_owned(),
            name: app.name().as_str().to_owned(),
            enable_ssh: app.enable_ssh(),
            revisions_enabled: app.revisions_enabled(),
            current_droplet: NullableGuidDto::of(app.droplet_guid()),
            relationships: AppRelationshipsDto {
                space: RelationshipDto::to(app.space_guid()),
            },
            links: AppLinksDto {
                self_link: LinkDto {
                    href: url_builder.build_url(&format!("/v3/apps/{}", app.guid())),
                },
                space: LinkDto {
                    href: url_builder.build_url(&format!("/v3/spaces/{}", app.space_guid())),
                },
            },
        }
    }
}
