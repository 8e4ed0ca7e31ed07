use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What to do with a lookup row or log line that can't be parsed.
#[derive(Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MalformedPolicy {
    /// Fail the whole run on the first offending input.
    #[default]
    Abort,
    /// Drop the input, log it and keep going.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_str() {
        assert_eq!(MalformedPolicy::from_str("abort"), Ok(MalformedPolicy::Abort));
        assert_eq!(MalformedPolicy::from_str("SKIP"), Ok(MalformedPolicy::Skip));
        assert!(MalformedPolicy::from_str("ignore").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(MalformedPolicy::Abort.to_string(), "abort");
        assert_eq!(MalformedPolicy::default(), MalformedPolicy::Abort);
    }
}
