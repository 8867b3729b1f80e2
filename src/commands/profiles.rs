use anyhow::Result;

use awsnav_aws::profiles::load_sso_profiles;
use awsnav_ui::Table;

/// Print every SSO-enabled profile from the shared AWS config file.
pub fn list() -> Result<()> {
    let found = load_sso_profiles()?;
    if found.is_empty() {
        println!("No SSO profiles found in the AWS config file.");
        return Ok(());
    }
    let mut table = Table::new(["PROFILE", "REGION", "ACCOUNT", "ROLE"]);
    for profile in &found {
        table.row([
            profile.name.as_str(),
            profile.region.as_deref().unwrap_or("-"),
            profile.sso_account_id.as_deref().unwrap_or("-"),
            profile.sso_role_name.as_deref().unwrap_or("-"),
        ]);
    }
    table.print();
    Ok(())
}
