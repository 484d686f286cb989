mod presenter;
mod types;

pub use presenter::present_deployment;
pub use types::{
    DeploymentLinksDto, DeploymentProcessDto, DeploymentRelationshipsDto, DeploymentResponse,
    DeploymentRevisionDto, DeploymentStatusDetailsDto, DeploymentStatusDto,
};
