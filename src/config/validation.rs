//! Config validation: unknown-key detection with "did you mean?" suggestions.
//!
//! The raw TOML is walked as a `toml::Value` tree before serde sees it, so
//! misspelled keys (which serde would silently ignore in favour of defaults)
//! are reported. Warnings never reject a config.

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Every valid dotted key path of `GazeConfig`.
///
/// Maintained by hand alongside gaze_config.rs.
pub const KNOWN_CONFIG_KEYS: &[&str] = &[
    // [server]
    "server",
    "server.addr",
    // [acquisition]
    "acquisition",
    "acquisition.poll_interval_ms",
    "acquisition.backoff_ms",
    "acquisition.connect_timeout_secs",
    "acquisition.progress_log_every",
    // [freshness]
    "freshness",
    "freshness.max_age_secs",
    // [classifier]
    "classifier",
    "classifier.left_fraction",
    "classifier.right_fraction",
];

/// Collect all dotted key paths present in a TOML value.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Closest known key within an edit distance of 3, if any.
pub fn suggest_correction(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| k.to_string())
}

/// Report every key in `raw_toml` that `GazeConfig` does not recognise.
///
/// Unparseable input yields no warnings; serde reports the parse error.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = toml::from_str::<toml::Value>(raw_toml) else {
        return Vec::new();
    };

    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !KNOWN_CONFIG_KEYS.contains(&key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, KNOWN_CONFIG_KEYS),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}
