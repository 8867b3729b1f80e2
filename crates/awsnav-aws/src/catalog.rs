//! Service Catalog product discovery and provisioning

use anyhow::{Context, Result};
use aws_sdk_servicecatalog::types::{
    AccessLevelFilter, AccessLevelFilterKey, ProvisioningArtifactGuidance, ProvisioningParameter,
};
use chrono::{DateTime, Utc};

use awsnav_types::{
    LaunchPath, ProductInfo, ProductVersion, ProvisionedProduct, ProvisioningParameterInfo,
    StatusDetail,
};

use crate::client::SessionContext;

/// List all products visible to the caller, sorted by name.
pub async fn list_products(ctx: &SessionContext) -> Result<Vec<ProductInfo>> {
    let client = ctx.catalog();
    let mut products = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let response = client
            .search_products()
            .set_page_token(page_token)
            .send()
            .await
            .context("Failed to list Service Catalog products")?;
        for view in response.product_view_summaries() {
            products.push(ProductInfo {
                id: view.product_id().unwrap_or_default().to_string(),
                name: view.name().unwrap_or("unnamed").to_string(),
                owner: view.owner().map(str::to_string),
                description: view.short_description().map(str::to_string),
            });
        }
        page_token = response.next_page_token().map(str::to_string);
        if page_token.is_none() {
            break;
        }
    }
    products.sort_by_key(|p| p.name.to_lowercase());
    Ok(products)
}

/// List provisioned products owned by this account.
pub async fn list_provisioned(ctx: &SessionContext) -> Result<Vec<ProvisionedProduct>> {
    let client = ctx.catalog();
    let mut provisioned = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let response = client
            .scan_provisioned_products()
            .access_level_filter(
                AccessLevelFilter::builder()
                    .key(AccessLevelFilterKey::Account)
                    .value("self")
                    .build(),
            )
            .set_page_token(page_token)
            .send()
            .await
            .context("Failed to list provisioned products")?;
        for detail in response.provisioned_products() {
            provisioned.push(ProvisionedProduct {
                id: detail.id().unwrap_or_default().to_string(),
                name: detail.name().unwrap_or("unnamed").to_string(),
                status: detail
                    .status()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                product_type: detail.r#type().unwrap_or("-").to_string(),
                created: detail
                    .created_time()
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), 0)),
            });
        }
        page_token = response.next_page_token().map(str::to_string);
        if page_token.is_none() {
            break;
        }
    }
    provisioned.sort_by_key(|p| p.name.to_lowercase());
    Ok(provisioned)
}

/// Versions of a product that can still be launched. Deprecated
/// artifacts are filtered out.
pub async fn product_versions(ctx: &SessionContext, product_id: &str) -> Result<Vec<ProductVersion>> {
    let response = ctx
        .catalog()
        .describe_product()
        .id(product_id)
        .send()
        .await
        .with_context(|| format!("Failed to describe product {product_id}"))?;

    Ok(response
        .provisioning_artifacts()
        .iter()
        .filter(|artifact| {
            artifact.guidance() != Some(&ProvisioningArtifactGuidance::Deprecated)
        })
        .map(|artifact| ProductVersion {
            id: artifact.id().unwrap_or_default().to_string(),
            name: artifact.name().unwrap_or("unnamed").to_string(),
            description: artifact.description().map(str::to_string),
        })
        .collect())
}

pub async fn launch_paths(ctx: &SessionContext, product_id: &str) -> Result<Vec<LaunchPath>> {
    let client = ctx.catalog();
    let mut paths = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let response = client
            .list_launch_paths()
            .product_id(product_id)
            .set_page_token(page_token)
            .send()
            .await
            .with_context(|| format!("Failed to list launch paths of {product_id}"))?;
        for summary in response.launch_path_summaries() {
            paths.push(LaunchPath {
                id: summary.id().unwrap_or_default().to_string(),
                name: summary.name().unwrap_or("unnamed").to_string(),
            });
        }
        page_token = response.next_page_token().map(str::to_string);
        if page_token.is_none() {
            break;
        }
    }
    Ok(paths)
}

/// Parameters the chosen version expects, with defaults and no-echo
/// flags for the prompt layer.
pub async fn provisioning_parameters(
    ctx: &SessionContext,
    product_id: &str,
    artifact_id: &str,
    path_id: &str,
) -> Result<Vec<ProvisioningParameterInfo>> {
    let response = ctx
        .catalog()
        .describe_provisioning_parameters()
        .product_id(product_id)
        .provisioning_artifact_id(artifact_id)
        .path_id(path_id)
        .send()
        .await
        .with_context(|| format!("Failed to describe parameters of {product_id}"))?;

    Ok(response
        .provisioning_artifact_parameters()
        .iter()
        .map(|param| ProvisioningParameterInfo {
            key: param.parameter_key().unwrap_or_default().to_string(),
            default_value: param.default_value().map(str::to_string),
            description: param.description().map(str::to_string),
            no_echo: param.is_no_echo().unwrap_or(false),
        })
        .collect())
}

/// Launch a product. Returns once the request is accepted; progress is
/// tracked afterwards through `provisioned_status`.
pub async fn provision(
    ctx: &SessionContext,
    product_id: &str,
    artifact_id: &str,
    path_id: &str,
    name: &str,
    parameters: Vec<(String, String)>,
) -> Result<()> {
    let mut request = ctx
        .catalog()
        .provision_product()
        .product_id(product_id)
        .provisioning_artifact_id(artifact_id)
        .path_id(path_id)
        .provisioned_product_name(name);
    for (key, value) in parameters {
        request = request.provisioning_parameters(
            ProvisioningParameter::builder().key(key).value(value).build(),
        );
    }
    request
        .send()
        .await
        .with_context(|| format!("Failed to provision '{name}'"))?;
    Ok(())
}

pub async fn provisioned_status(
    ctx: &SessionContext,
    provisioned_id: &str,
) -> Result<StatusDetail> {
    let response = ctx
        .catalog()
        .describe_provisioned_product()
        .id(provisioned_id)
        .send()
        .await
        .with_context(|| format!("Failed to describe provisioned product {provisioned_id}"))?;

    let detail = response
        .provisioned_product_detail()
        .with_context(|| format!("Provisioned product {provisioned_id} not found"))?;
    Ok(StatusDetail {
        status: detail
            .status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        message: detail.status_message().map(str::to_string),
    })
}

pub async fn terminate(ctx: &SessionContext, provisioned_id: &str) -> Result<()> {
    ctx.catalog()
        .terminate_provisioned_product()
        .provisioned_product_id(provisioned_id)
        .send()
        .await
        .with_context(|| format!("Failed to terminate provisioned product {provisioned_id}"))?;
    Ok(())
}
