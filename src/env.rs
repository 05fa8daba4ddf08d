use std::env as stdenv;

/// Immutable snapshot of the process environment.
///
/// Captured once when the shell starts and shared read-only by every
/// resolution and execution afterwards. The shell never writes the
/// environment back, so an ordered list of pairs is all the state there is;
/// the capture order is the order handed to spawned children.
#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    vars: Vec<(String, String)>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs, for tests and for embedding the
    /// shell with a synthetic environment.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable. The first pair with a matching key wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs, in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_sees_the_process_environment() {
        let env = EnvSnapshot::capture();
        assert!(env.get("PATH").is_some());
    }

    #[test]
    fn get_finds_explicit_pairs() {
        let env = EnvSnapshot::from_pairs([("KEY", "VALUE")]);
        assert_eq!(env.get("KEY"), Some("VALUE"));
        assert_eq!(env.get("OTHER"), None);
    }

    #[test]
    fn first_matching_key_wins() {
        let env = EnvSnapshot::from_pairs([("KEY", "first"), ("KEY", "second")]);
        assert_eq!(env.get("KEY"), Some("first"));
    }

    #[test]
    fn iter_preserves_capture_order() {
        let env = EnvSnapshot::from_pairs([("A", "1"), ("B", "2"), ("C", "3")]);
        let keys: Vec<&str> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }
}
