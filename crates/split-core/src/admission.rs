/// Input-port admission policy.
///
/// Decides which discovered input ports the engine attaches to. The port
/// whose name equals the virtual output name is always refused, whatever
/// the user configured: attaching to our own output would feed the merged
/// stream back into itself.

use crate::wildcard::Wildcard;

/// Why a port was admitted or refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admitted,
    /// The port is our own virtual output (feedback prevention).
    MatchesVirtualOutput,
    /// The port name matched a configured exclusion pattern.
    MatchesExclusion { pattern: String },
}

impl Verdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Admission decisions for one configured engine instance.
pub struct AdmissionPolicy {
    virtual_output: String,
    exclusions: Vec<Wildcard>,
}

impl AdmissionPolicy {
    pub fn new(virtual_output: impl Into<String>, exclusion_patterns: &[String]) -> Self {
        Self {
            virtual_output: virtual_output.into(),
            exclusions: exclusion_patterns.iter().map(|p| Wildcard::new(p)).collect(),
        }
    }

    /// Decide whether to attach to `port_name`, with the reason.
    pub fn verdict(&self, port_name: &str) -> Verdict {
        if port_name == self.virtual_output {
            return Verdict::MatchesVirtualOutput;
        }
        for pattern in &self.exclusions {
            if pattern.matches(port_name) {
                return Verdict::MatchesExclusion {
                    pattern: pattern.pattern().to_string(),
                };
            }
        }
        Verdict::Admitted
    }

    /// Boolean view of `verdict`.
    pub fn should_attach(&self, port_name: &str) -> bool {
        self.verdict(port_name).is_admitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_output_always_excluded() {
        let policy = AdmissionPolicy::new("Split Out", &[]);
        assert!(!policy.should_attach("Split Out"));
        assert_eq!(policy.verdict("Split Out"), Verdict::MatchesVirtualOutput);
    }

    #[test]
    fn test_any_matching_pattern_excludes() {
        let patterns = vec!["Ctrl*".to_string(), "*Through*".to_string()];
        let policy = AdmissionPolicy::new("Split Out", &patterns);

        assert!(!policy.should_attach("Controller A"));
        assert!(!policy.should_attach("Midi Through Port-0"));
        assert!(policy.should_attach("Keyboard"));
    }

    #[test]
    fn test_exclusion_reports_the_matching_pattern() {
        let patterns = vec!["Akai*".to_string()];
        let policy = AdmissionPolicy::new("Split Out", &patterns);

        assert_eq!(
            policy.verdict("Akai MPK Mini"),
            Verdict::MatchesExclusion {
                pattern: "Akai*".to_string()
            }
        );
    }

    #[test]
    fn test_feedback_rule_precedes_patterns() {
        // Even a pattern that would not match the output name cannot
        // override the feedback rule.
        let policy = AdmissionPolicy::new("Split Out", &["zzz".to_string()]);
        assert_eq!(policy.verdict("Split Out"), Verdict::MatchesVirtualOutput);
    }

    #[test]
    fn test_no_patterns_admits_everything_else() {
        let policy = AdmissionPolicy::new("Split Out", &[]);
        assert!(policy.should_attach("Any Hardware Port"));
    }
}
