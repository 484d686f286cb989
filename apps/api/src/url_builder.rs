use nimbus_core::AppError;
use url::Url;

/// Builds absolute links to API resources from the external scheme and host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrlBuilder {
    base: Url,
}

impl ApiUrlBuilder {
    pub fn new(protocol: &str, domain: &str) -> Result<Self, AppError> {
        let protocol = protocol.trim().trim_end_matches("://");
        let domain = domain.trim().trim_end_matches('/');
        if domain.is_empty() {
            return Err(AppError::Validation(
                "EXTERNAL_DOMAIN must not be empty".to_owned(),
            ));
        }

        let base = Url::parse(&format!("{protocol}://{domain}")).map_err(|error| {
            AppError::Validation(format!(
                "invalid external url '{protocol}://{domain}': {error}"
            ))
        })?;

        Ok(Self { base })
    }

    /// Returns the absolute url of `path`, e.g. `/v3/apps/{guid}`.
    pub fn build_url(&self, path: &str) -> String {
        let mut url = self.base.clone();
        url.set_path(path);
        url.to_string()
    }
}
