//! SSO profile discovery from the shared AWS config file

use std::path::PathBuf;

use awsnav_types::ProfileInfo;

use crate::error::SessionError;

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".aws").join("config"))
}

/// Load all SSO-enabled profiles from ~/.aws/config. A missing file
/// yields an empty list, not an error.
pub fn load_sso_profiles() -> Result<Vec<ProfileInfo>, SessionError> {
    let Some(path) = config_path() else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&path)?;
    Ok(parse_sso_profiles(&text))
}

/// Look up one profile by name
pub fn find_profile(name: &str) -> Result<ProfileInfo, SessionError> {
    load_sso_profiles()?
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| SessionError::ProfileNotFound(name.to_string()))
}

/// Parse INI-style config text and keep the profiles that use SSO,
/// detected by either a legacy `sso_start_url` key or an `sso_session`
/// reference.
pub fn parse_sso_profiles(text: &str) -> Vec<ProfileInfo> {
    let mut profiles = Vec::new();
    let mut current: Option<ProfileInfo> = None;
    let mut is_sso = false;

    let mut flush = |profile: Option<ProfileInfo>, is_sso: bool, out: &mut Vec<ProfileInfo>| {
        if let Some(profile) = profile {
            if is_sso {
                out.push(profile);
            }
        }
    };

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            flush(current.take(), is_sso, &mut profiles);
            is_sso = false;
            let section = &line[1..line.len() - 1];
            let name = section
                .strip_prefix("profile ")
                .map(str::trim)
                .or_else(|| (section == "default").then_some("default"));
            current = name.map(|n| ProfileInfo::new(n.to_string()));
            continue;
        }
        let Some(profile) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            "region" => profile.region = Some(value.to_string()),
            "sso_account_id" => profile.sso_account_id = Some(value.to_string()),
            "sso_role_name" => profile.sso_role_name = Some(value.to_string()),
            "sso_start_url" | "sso_session" => is_sso = true,
            _ => {}
        }
    }
    flush(current.take(), is_sso, &mut profiles);
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# comment
[default]
region = us-east-1
output = json

[profile dev]
sso_session = corp
sso_account_id = 111111111111
sso_role_name = DevAccess
region = eu-west-1

[profile legacy-sso]
sso_start_url = https://corp.awsapps.com/start
sso_account_id = 222222222222
sso_role_name = AdminAccess

[profile plain-keys]
aws_access_key_id = AKIA123
aws_secret_access_key = secret
"#;

    #[test]
    fn test_keeps_only_sso_profiles() {
        let profiles = parse_sso_profiles(SAMPLE);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["dev", "legacy-sso"]);
    }

    #[test]
    fn test_parses_profile_fields() {
        let profiles = parse_sso_profiles(SAMPLE);
        let dev = &profiles[0];
        assert_eq!(dev.region.as_deref(), Some("eu-west-1"));
        assert_eq!(dev.sso_account_id.as_deref(), Some("111111111111"));
        assert_eq!(dev.sso_role_name.as_deref(), Some("DevAccess"));
    }

    #[test]
    fn test_default_section_with_sso_is_kept() {
        let text = "[default]\nsso_start_url = https://x.awsapps.com/start\n";
        let profiles = parse_sso_profiles(text);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "default");
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(parse_sso_profiles("").is_empty());
        assert!(parse_sso_profiles("not an ini file at all").is_empty());
    }
}
