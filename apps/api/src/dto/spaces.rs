use nimbus_domain::Space;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dto::common::{LinkDto, RelationshipDto};
use crate::url_builder::ApiUrlBuilder;

/// Incoming payload for space creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-space-request.ts"
)]
pub struct CreateSpaceRequest {
    pub name: String,
    pub relationships: SpaceRelationshipsDto,
}

/// Incoming payload for space updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-space-request.ts"
)]
pub struct UpdateSpaceRequest {
    pub name: Option<String>,
}

/// Query parameters for space deletion.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteSpaceQuery {
    pub recursive: Option<bool>,
}

/// Relationships of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/space-relationships-dto.ts"
)]
pub struct SpaceRelationshipsDto {
    pub organization: RelationshipDto,
}

/// Links of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/space-links-dto.ts"
)]
pub struct SpaceLinksDto {
    #[serde(rename = "self")]
    pub self_link: LinkDto,
    pub organization: LinkDto,
}

/// API representation of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/space-response.ts"
)]
pub struct SpaceResponse {
    pub guid: String,
    pub name: String,
    pub relationships: SpaceRelationshipsDto,
    pub links: SpaceLinksDto,
}

impl SpaceResponse {
    pub fn present(space: &Space, url_builder: &ApiUrlBuilder) -> Self {
        Self {
            guid: space.guid().as_str().to_owned(),
            name: space.name().as_str().to_owned(),
            relationships: SpaceRelationshipsDto {
                organization: RelationshipDto::to(space.organization_guid()),
            },
            links: SpaceLinksDto {
                self_link: LinkDto {
                    href: url_builder.build_url(&format!("/v3/spaces/{}", space.guid())),
                },
                organization: LinkDto {
                    href: url_builder.build_url(&format!(
                        "/v3/organizations/{}",
                        space.organization_guid()
                    )),
                },
            },
        }
    }
}
