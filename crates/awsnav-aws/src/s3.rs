//! S3 bucket browsing and simple transfers

use std::path::Path;

use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};

use awsnav_types::{BucketInfo, DirListing, ObjectEntry};

use crate::client::SessionContext;

pub async fn list_buckets(ctx: &SessionContext) -> Result<Vec<BucketInfo>> {
    let response = ctx
        .s3()
        .list_buckets()
        .send()
        .await
        .context("Failed to list buckets")?;
    Ok(response
        .buckets()
        .iter()
        .map(|bucket| BucketInfo {
            name: bucket.name().unwrap_or_default().to_string(),
            created: bucket
                .creation_date()
                .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), 0)),
        })
        .collect())
}

/// List one `/`-delimited level of a bucket. `prefix` is "" for the
/// root, otherwise ends with `/`.
pub async fn list_dir(ctx: &SessionContext, bucket: &str, prefix: &str) -> Result<DirListing> {
    let mut listing = DirListing::default();
    let mut pages = ctx
        .s3()
        .list_objects_v2()
        .bucket(bucket)
        .prefix(prefix)
        .delimiter("/")
        .into_paginator()
        .send();
    while let Some(page) = pages.next().await {
        let page = page.with_context(|| format!("Failed to list s3://{bucket}/{prefix}"))?;
        for common in page.common_prefixes() {
            if let Some(folder) = common.prefix() {
                listing.folders.push(folder.to_string());
            }
        }
        for object in page.contents() {
            let Some(key) = object.key() else { continue };
            // The prefix itself shows up as a zero-byte folder marker.
            if key == prefix {
                continue;
            }
            listing.objects.push(ObjectEntry {
                key: key.to_string(),
                size: object.size().unwrap_or(0),
                modified: object
                    .last_modified()
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), 0)),
            });
        }
    }
    Ok(listing)
}

/// Download an object to a local path, returning the byte count.
pub async fn download(
    ctx: &SessionContext,
    bucket: &str,
    key: &str,
    destination: &Path,
) -> Result<u64> {
    let response = ctx
        .s3()
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .with_context(|| format!("Failed to get s3://{bucket}/{key}"))?;
    let bytes = response
        .body
        .collect()
        .await
        .with_context(|| format!("Failed to read body of s3://{bucket}/{key}"))?
        .into_bytes();
    let len = bytes.len() as u64;
    tokio::fs::write(destination, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", destination.display()))?;
    Ok(len)
}

/// Upload a local file under the given key.
pub async fn upload(ctx: &SessionContext, bucket: &str, key: &str, source: &Path) -> Result<()> {
    let body = ByteStream::from_path(source)
        .await
        .with_context(|| format!("Failed to read {}", source.display()))?;
    ctx.s3()
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body)
        .send()
        .await
        .with_context(|| format!("Failed to upload s3://{bucket}/{key}"))?;
    Ok(())
}
