//! API Gateway v2 (HTTP API) inspection and route creation

use anyhow::{Context, Result};
use aws_sdk_apigatewayv2::types::{AuthorizationType, IntegrationType};

use awsnav_types::{ApiInfo, AuthorizerInfo, IntegrationInfo, RouteInfo};

use crate::client::SessionContext;

/// Authorization applied to a new route
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAuth {
    Open,
    AwsIam,
    Authorizer(String),
}

/// Integration created for a new route, carrying its target URI
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrationKind {
    /// Lambda proxy integration (payload format 2.0)
    LambdaProxy(String),
    /// Plain HTTP proxy to a URL
    HttpProxy(String),
}

pub async fn list_apis(ctx: &SessionContext) -> Result<Vec<ApiInfo>> {
    let client = ctx.apigateway();
    let mut apis = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let response = client
            .get_apis()
            .set_next_token(next_token)
            .send()
            .await
            .context("Failed to list APIs")?;
        for api in response.items() {
            apis.push(ApiInfo {
                id: api.api_id().unwrap_or_default().to_string(),
                name: api.name().unwrap_or("unnamed").to_string(),
                protocol: api
                    .protocol_type()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            });
        }
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }
    Ok(apis)
}

pub async fn list_routes(ctx: &SessionContext, api_id: &str) -> Result<Vec<RouteInfo>> {
    let client = ctx.apigateway();
    let mut routes = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let response = client
            .get_routes()
            .api_id(api_id)
            .set_next_token(next_token)
            .send()
            .await
            .with_context(|| format!("Failed to list routes of API {api_id}"))?;
        for route in response.items() {
            routes.push(RouteInfo {
                id: route.route_id().unwrap_or_default().to_string(),
                route_key: route.route_key().unwrap_or_default().to_string(),
                target: route.target().map(str::to_string),
                authorization: route
                    .authorization_type()
                    .map(|a| a.as_str().to_string()),
            });
        }
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }
    Ok(routes)
}

pub async fn list_authorizers(ctx: &SessionContext, api_id: &str) -> Result<Vec<AuthorizerInfo>> {
    let client = ctx.apigateway();
    let mut authorizers = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let response = client
            .get_authorizers()
            .api_id(api_id)
            .set_next_token(next_token)
            .send()
            .await
            .with_context(|| format!("Failed to list authorizers of API {api_id}"))?;
        for authorizer in response.items() {
            authorizers.push(AuthorizerInfo {
                id: authorizer.authorizer_id().unwrap_or_default().to_string(),
                name: authorizer.name().unwrap_or("unnamed").to_string(),
            });
        }
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }
    Ok(authorizers)
}

pub async fn list_integrations(ctx: &SessionContext, api_id: &str) -> Result<Vec<IntegrationInfo>> {
    let client = ctx.apigateway();
    let mut integrations = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let response = client
            .get_integrations()
            .api_id(api_id)
            .set_next_token(next_token)
            .send()
            .await
            .with_context(|| format!("Failed to list integrations of API {api_id}"))?;
        for integration in response.items() {
            integrations.push(IntegrationInfo {
                id: integration.integration_id().unwrap_or_default().to_string(),
                integration_type: integration
                    .integration_type()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                uri: integration.integration_uri().map(str::to_string),
            });
        }
        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }
    Ok(integrations)
}

/// Create an integration and return its id.
pub async fn create_integration(
    ctx: &SessionContext,
    api_id: &str,
    kind: IntegrationKind,
) -> Result<String> {
    let request = match kind {
        IntegrationKind::LambdaProxy(arn) => ctx
            .apigateway()
            .create_integration()
            .api_id(api_id)
            .integration_type(IntegrationType::AwsProxy)
            .integration_uri(arn)
            .payload_format_version("2.0"),
        IntegrationKind::HttpProxy(url) => ctx
            .apigateway()
            .create_integration()
            .api_id(api_id)
            .integration_type(IntegrationType::HttpProxy)
            .integration_uri(url)
            .integration_method("ANY")
            .payload_format_version("1.0"),
    };
    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to create integration on API {api_id}"))?;
    response
        .integration_id()
        .map(str::to_string)
        .context("Integration was created without an id")
}

/// Create a route, optionally wired to an integration, and return the
/// new route id.
pub async fn create_route(
    ctx: &SessionContext,
    api_id: &str,
    route_key: &str,
    integration_id: Option<&str>,
    auth: RouteAuth,
) -> Result<String> {
    let mut request = ctx
        .apigateway()
        .create_route()
        .api_id(api_id)
        .route_key(route_key);
    if let Some(id) = integration_id {
        request = request.target(format!("integrations/{id}"));
    }
    request = match auth {
        RouteAuth::Open => request.authorization_type(AuthorizationType::None),
        RouteAuth::AwsIam => request.authorization_type(AuthorizationType::AwsIam),
        RouteAuth::Authorizer(id) => request
            .authorization_type(AuthorizationType::Custom)
            .authorizer_id(id),
    };
    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to create route {route_key} on API {api_id}"))?;
    response
        .route_id()
        .map(str::to_string)
        .context("Route was created without an id")
}
