//! Cloud Control backed control plane
//!
//! One uniform get/list surface per CloudFormation type name. Property
//! documents come back as JSON strings and are decoded here; everything above
//! this module only sees `serde_json` values.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_cloudcontrol::Client as CloudControlClient;
use serde_json::Value;
use tracing::debug;

use surveyor_core::error::{DiscoveryError, DiscoveryResult};
use surveyor_core::provider::{ControlPlane, ResourceDescription, ResourcePage};
use surveyor_core::scope::Scope;

/// AWS Cloud Control client bound to one account+region scope
pub struct CloudControl {
    client: CloudControlClient,
    scope: Scope,
}

impl CloudControl {
    /// Connect using the default credential chain and an explicit region
    pub async fn connect(account_id: &str, region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: CloudControlClient::new(&config),
            scope: Scope::new(account_id, region),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    fn decode_properties(properties: Option<&str>) -> Value {
        properties
            .and_then(|p| serde_json::from_str(p).ok())
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ControlPlane for CloudControl {
    async fn get(
        &self,
        type_name: &str,
        identifier: &str,
    ) -> DiscoveryResult<Option<ResourceDescription>> {
        debug!(type_name, identifier, "cloud control get");

        let result = self
            .client
            .get_resource()
            .type_name(type_name)
            .identifier(identifier)
            .send()
            .await;

        match result {
            Ok(response) => match response.resource_description() {
                Some(description) => Ok(Some(ResourceDescription::new(
                    description.identifier().unwrap_or(identifier),
                    Self::decode_properties(description.properties()),
                ))),
                None => Ok(None),
            },
            Err(e) => {
                let message = format!("{e:?}");
                if message.contains("ResourceNotFound") || message.contains("NotFound") {
                    Ok(None)
                } else {
                    Err(DiscoveryError::provider(
                        &self.scope,
                        format!("get {type_name} {identifier} failed: {message}"),
                    ))
                }
            }
        }
    }

    async fn list_page(
        &self,
        type_name: &str,
        next_token: Option<&str>,
    ) -> DiscoveryResult<ResourcePage> {
        debug!(type_name, ?next_token, "cloud control list page");

        let mut request = self.client.list_resources().type_name(type_name);
        if let Some(token) = next_token {
            request = request.next_token(token);
        }

        let response = request.send().await.map_err(|e| {
            DiscoveryError::provider(&self.scope, format!("list {type_name} failed: {e:?}"))
        })?;

        let resources = response
            .resource_descriptions()
            .iter()
            .filter_map(|description| {
                let identifier = description.identifier()?;
                Some(ResourceDescription::new(
                    identifier,
                    Self::decode_properties(description.properties()),
                ))
            })
            .collect();

        Ok(ResourcePage {
            resources,
            next_token: response.next_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_properties() {
        assert_eq!(
            CloudControl::decode_properties(Some(r#"{"VpcId":"vpc-1"}"#)),
            json!({"VpcId": "vpc-1"})
        );
        assert_eq!(CloudControl::decode_properties(Some("not json")), Value::Null);
        assert_eq!(CloudControl::decode_properties(None), Value::Null);
    }
}
