use serde::Deserialize;

/// Tuning for the personal-project backfill.
///
/// `batch_size` is how many user rows are read per page; `concurrency`
/// bounds how many per-user insert pairs run at once within a page.
#[derive(Debug, Clone, Deserialize)]
pub struct BackfillConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_concurrency() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = BackfillConfig::default();
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.concurrency, 10);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: BackfillConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.concurrency, 10);

        let cfg: BackfillConfig = serde_json::from_str(r#"{"batch_size": 25}"#).unwrap();
        assert_eq!(cfg.batch_size, 25);
        assert_eq!(cfg.concurrency, 10);
    }
}
