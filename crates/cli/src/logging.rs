use crate::config::{LoggingConfig, LoggingLevelsConfig};
use regex::Regex;
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Query-string credentials some rate providers put in their URLs.
const DEFAULT_PATTERNS: &[(&str, &str)] = &[(
    r"(?i)\b(api[_-]?key|access[_-]?key|app[_-]?id|token)=[^&\s]+",
    "$1=[REDACTED]",
)];

struct RedactingWriter<W> {
    inner: W,
    patterns: Vec<(Regex, String)>,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let mut redacted = s.to_string();
        for (re, replacement) in &self.patterns {
            redacted = re.replace_all(&redacted, replacement.as_str()).to_string();
        }
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter {
    patterns: Vec<(Regex, String)>,
}

impl<'a> fmt::MakeWriter<'a> for RedactingMakeWriter {
    // stdout carries command results; logs stay on stderr.
    type Writer = RedactingWriter<io::Stderr>;

    fn make_writer(&self) -> Self::Writer {
        RedactingWriter {
            inner: io::stderr(),
            patterns: self.patterns.clone(),
        }
    }
}

/// Most verbose level enabled in config.
fn level_directive(levels: &LoggingLevelsConfig) -> &'static str {
    if levels.debug {
        "debug"
    } else if levels.info {
        "info"
    } else if levels.warning {
        "warn"
    } else if levels.error || levels.critical {
        "error"
    } else {
        "off"
    }
}

fn redaction_patterns(config: &LoggingConfig) -> Vec<(Regex, String)> {
    let redaction = &config.redaction;
    if !redaction.enabled {
        return Vec::new();
    }

    let mut patterns = Vec::new();
    if redaction.use_default_patterns {
        for (re, placeholder) in DEFAULT_PATTERNS {
            if let Ok(re) = Regex::new(re) {
                patterns.push((re, placeholder.to_string()));
            }
        }
    }
    for p in &redaction.patterns {
        match Regex::new(&p.regex) {
            Ok(re) => patterns.push((re, p.placeholder.clone())),
            Err(e) => eprintln!("warning: skipping redaction pattern '{}': {}", p.name, e),
        }
    }
    patterns
}

/// `RUST_LOG` wins over the configured levels.
pub fn init_logging(config: &LoggingConfig) {
    let level = level_directive(&config.levels);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let make_writer = RedactingMakeWriter {
        patterns: redaction_patterns(config),
    };
    let format = &config.format;

    // Use Layer::boxed() to unify the types of the branches
    let fmt_layer = match (format.json, format.show_time) {
        (true, _) => fmt::layer()
            .json()
            .with_writer(make_writer)
            .with_file(format.show_file)
            .with_line_number(format.show_line)
            .boxed(),
        (false, true) => fmt::layer()
            .with_writer(make_writer)
            .with_target(format.show_file)
            .with_file(format.show_file)
            .with_line_number(format.show_line)
            .boxed(),
        (false, false) => fmt::layer()
            .with_writer(make_writer)
            .with_target(format.show_file)
            .with_file(format.show_file)
            .with_line_number(format.show_line)
            .without_time()
            .boxed(),
    };

    // A second init (e.g. from tests) is ignored.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedactionPattern;
    use std::io::Write;

    fn redact(config: &LoggingConfig, line: &str) -> String {
        let mut w = RedactingWriter {
            inner: Vec::new(),
            patterns: redaction_patterns(config),
        };
        w.write_all(line.as_bytes()).unwrap();
        String::from_utf8(w.inner).unwrap()
    }

    #[test]
    fn default_patterns_mask_query_credentials() {
        let config = LoggingConfig::default();
        let out = redact(&config, "GET https://rates.test/latest?app_id=abc123&base=USD failed");
        assert_eq!(out, "GET https://rates.test/latest?app_id=[REDACTED]&base=USD failed");
    }

    #[test]
    fn custom_patterns_apply_and_bad_ones_are_skipped() {
        let mut config = LoggingConfig::default();
        config.redaction.patterns = vec![
            RedactionPattern {
                name: "bearer".into(),
                regex: "Bearer [A-Za-z0-9._-]+".into(),
                placeholder: "Bearer ***".into(),
            },
            RedactionPattern {
                name: "broken".into(),
                regex: "(".into(),
                placeholder: "".into(),
            },
        ];
        assert_eq!(redact(&config, "auth: Bearer xyz.123"), "auth: Bearer ***");
    }

    #[test]
    fn disabled_redaction_passes_through() {
        let mut config = LoggingConfig::default();
        config.redaction.enabled = false;
        assert_eq!(redact(&config, "token=secret"), "token=secret");
    }

    #[test]
    fn most_verbose_level_wins() {
        let mut levels = LoggingLevelsConfig::default();
        assert_eq!(level_directive(&levels), "warn");
        levels.info = true;
        assert_eq!(level_directive(&levels), "info");
        levels.debug = true;
        assert_eq!(level_directive(&levels), "debug");

        let none = LoggingLevelsConfig {
            debug: false,
            info: false,
            warning: false,
            error: false,
            critical: false,
        };
        assert_eq!(level_directive(&none), "off");
    }
}
