use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use awsnav_aws::SessionContext;
use awsnav_aws::s3;
use awsnav_ui::{Choice, Menu, Nav, confirm, human_size, input_default, pause};

pub async fn wizard(ctx: &SessionContext) -> Result<Nav> {
    loop {
        let buckets = match s3::list_buckets(ctx).await {
            Ok(buckets) => buckets,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };
        if buckets.is_empty() {
            println!("No buckets in this account.");
            return Ok(Nav::Back);
        }
        let menu = Menu::new("Bucket")
            .items(buckets.iter().map(|b| (b.name.clone(), b.name.clone())))
            .with_refresh()
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(bucket) => {
                let bucket = bucket.clone();
                if browse(ctx, &bucket).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

/// Strip the last path segment of a folder prefix. The root's parent is
/// the root itself, spelled "".
fn parent_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[..=idx].to_string(),
        None => String::new(),
    }
}

/// Last path segment of a key or folder prefix, for display.
fn leaf<'a>(full: &'a str, prefix: &str) -> &'a str {
    full.strip_prefix(prefix).unwrap_or(full)
}

enum Entry {
    Up,
    Folder(String),
    Object(String),
    Upload,
}

/// Walk one bucket a folder level at a time. "Back" from the root
/// returns to the bucket list.
async fn browse(ctx: &SessionContext, bucket: &str) -> Result<Nav> {
    let mut prefix = String::new();
    loop {
        let listing = match s3::list_dir(ctx, bucket, &prefix).await {
            Ok(listing) => listing,
            Err(e) => {
                super::report(&e);
                pause()?;
                return Ok(Nav::Back);
            }
        };

        let mut menu = Menu::new(format!("s3://{bucket}/{prefix}"));
        if !prefix.is_empty() {
            menu = menu.item("..", Entry::Up);
        }
        for folder in &listing.folders {
            menu = menu.item(
                format!("{}/", leaf(folder, &prefix).trim_end_matches('/')),
                Entry::Folder(folder.clone()),
            );
        }
        for object in &listing.objects {
            menu = menu.item(
                format!("{}  ({})", leaf(&object.key, &prefix), human_size(object.size)),
                Entry::Object(object.key.clone()),
            );
        }
        let menu = menu
            .item("Upload a file here", Entry::Upload)
            .with_refresh()
            .with_back("Back")
            .with_exit();

        match menu.prompt()? {
            Choice::Item(Entry::Up) => prefix = parent_prefix(&prefix),
            Choice::Item(Entry::Folder(folder)) => prefix = folder.clone(),
            Choice::Item(Entry::Object(key)) => {
                let key = key.clone();
                if object_menu(ctx, bucket, &key).await? == Nav::Exit {
                    return Ok(Nav::Exit);
                }
            }
            Choice::Item(Entry::Upload) => {
                if let Err(e) = upload_wizard(ctx, bucket, &prefix).await {
                    super::report(&e);
                    pause()?;
                }
            }
            Choice::Nav(Nav::Refresh) => continue,
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(Nav::Exit) => return Ok(Nav::Exit),
        }
    }
}

#[derive(Clone, Copy)]
enum ObjectAction {
    Download,
}

async fn object_menu(ctx: &SessionContext, bucket: &str, key: &str) -> Result<Nav> {
    loop {
        let menu = Menu::new(format!("s3://{bucket}/{key}"))
            .item("Download", ObjectAction::Download)
            .with_back("Back")
            .with_exit();
        match menu.prompt()? {
            Choice::Item(ObjectAction::Download) => {
                if let Err(e) = download_flow(ctx, bucket, key).await {
                    super::report(&e);
                }
                pause()?;
            }
            Choice::Nav(Nav::Back) => return Ok(Nav::Back),
            Choice::Nav(_) => return Ok(Nav::Exit),
        }
    }
}

async fn download_flow(ctx: &SessionContext, bucket: &str, key: &str) -> Result<()> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let destination = input_default("Save as", file_name)?;
    let destination = PathBuf::from(destination.trim());
    if destination.exists()
        && !confirm(
            &format!("{} exists, overwrite?", destination.display()),
            false,
        )?
    {
        println!("Aborted.");
        return Ok(());
    }
    let bytes = s3::download(ctx, bucket, key, &destination).await?;
    println!(
        "{}",
        format!(
            "Wrote {} to {}.",
            human_size(bytes as i64),
            destination.display()
        )
        .green()
    );
    Ok(())
}

/// Pick a file from the current directory and upload it under the
/// prefix being browsed.
async fn upload_wizard(ctx: &SessionContext, bucket: &str, prefix: &str) -> Result<()> {
    let files = local_files(Path::new("."))?;
    if files.is_empty() {
        println!("No files in the current directory.");
        pause()?;
        return Ok(());
    }

    let menu = Menu::new("File to upload")
        .items(files.iter().map(|f| (f.clone(), f.clone())))
        .with_back("Cancel");
    let file = match menu.prompt()? {
        Choice::Item(file) => file.clone(),
        Choice::Nav(_) => return Ok(()),
    };

    let key = format!("{prefix}{file}");
    if !confirm(&format!("Upload '{file}' to s3://{bucket}/{key}?"), false)? {
        println!("Aborted.");
        return Ok(());
    }
    s3::upload(ctx, bucket, &key, Path::new(&file)).await?;
    println!("{}", format!("Uploaded s3://{bucket}/{key}.").green());
    pause()?;
    Ok(())
}

fn local_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_prefix_walks_up_one_level() {
        assert_eq!(parent_prefix("logs/2024/03/"), "logs/2024/");
        assert_eq!(parent_prefix("logs/"), "");
        assert_eq!(parent_prefix(""), "");
    }

    #[test]
    fn test_leaf_strips_the_browsed_prefix() {
        assert_eq!(leaf("logs/2024/app.log", "logs/2024/"), "app.log");
        assert_eq!(leaf("logs/2024/", "logs/"), "2024/");
        assert_eq!(leaf("top.txt", ""), "top.txt");
    }
}
