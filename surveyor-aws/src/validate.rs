//! Account and region input validation
//!
//! Applied to user-supplied scope segments before a client is built, so a
//! typo fails fast instead of surfacing as an opaque provider error.

use std::sync::LazyLock;

use regex::Regex;

use surveyor_core::error::{DiscoveryError, DiscoveryResult};

static ACCOUNT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12}$").expect("account id pattern"));

static REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("region pattern"));

/// AWS account ids are exactly twelve digits
pub fn validate_account_id(account_id: &str) -> DiscoveryResult<()> {
    if ACCOUNT_ID.is_match(account_id) {
        Ok(())
    } else {
        Err(DiscoveryError::invalid_query(format!(
            "{account_id:?} is not a twelve-digit account id"
        )))
    }
}

/// Regions look like `us-east-1` or `ap-northeast-1`
pub fn validate_region(region: &str) -> DiscoveryResult<()> {
    if REGION.is_match(region) {
        Ok(())
    } else {
        Err(DiscoveryError::invalid_query(format!(
            "{region:?} is not a region name"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_account_id() {
        assert!(validate_account_id("123456789012").is_ok());
        assert!(validate_account_id("12345678901").is_err());
        assert!(validate_account_id("1234567890123").is_err());
        assert!(validate_account_id("12345678901a").is_err());
    }

    #[test]
    fn test_validate_region() {
        assert!(validate_region("us-east-1").is_ok());
        assert!(validate_region("ap-northeast-1").is_ok());
        assert!(validate_region("eu-central-2").is_ok());
        assert!(validate_region("useast1").is_err());
        assert!(validate_region("US-EAST-1").is_err());
        assert!(validate_region("us-east-").is_err());
    }
}
