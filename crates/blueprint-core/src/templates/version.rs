//! Version comparison for CLI and local blueprint compatibility

use semver::Version;

/// Compare CLI version against the version a blueprint was written for
/// Returns a warning message if the CLI is older than the blueprint expects
pub fn check_compatibility(
    cli_version: &str,
    blueprint_name: &str,
    blueprint_version: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version)?;
    let blueprint_ver = parse_version(blueprint_version)?;

    if cli_ver < blueprint_ver {
        Some(format!(
            "Blueprint '{}' was written for CLI version {} or newer, you are running {}",
            blueprint_name, blueprint_version, cli_version
        ))
    } else {
        None
    }
}

/// Parse version string, tolerating a leading 'v'
fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_older_than_blueprint() {
        let warning = check_compatibility("0.1.0", "component", "0.2.0");
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_as_blueprint() {
        assert!(check_compatibility("0.1.0", "component", "0.1.0").is_none());
    }

    #[test]
    fn test_cli_newer_than_blueprint() {
        assert!(check_compatibility("0.2.0", "component", "v0.1.0").is_none());
    }

    #[test]
    fn test_invalid_versions() {
        // Should return None (no warning) for invalid versions
        assert!(check_compatibility("invalid", "component", "0.1.0").is_none());
        assert!(check_compatibility("0.1.0", "component", "latest").is_none());
    }
}
