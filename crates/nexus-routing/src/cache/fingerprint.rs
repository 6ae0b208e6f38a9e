use nexus_core::Request;
use sha2::{Digest, Sha256};

/// Cache key for `request`.
///
/// Covers prompt, task type, and complexity only. User, context, and priority
/// are left out, so identical questions from different users share an entry.
/// Each field is length-prefixed so field boundaries cannot collide.
pub fn fingerprint(request: &Request) -> String {
    let mut hasher = Sha256::new();
    for field in [
        request.prompt.as_str(),
        request.task_type.as_str(),
        request.complexity.as_str(),
    ] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::Complexity;
    use serde_json::json;

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let key = fingerprint(&Request::new("hello"));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|symbol| symbol.is_ascii_hexdigit()));
        assert_eq!(key, fingerprint(&Request::new("hello")));
    }

    #[test]
    fn test_fingerprint_ignores_user_context_and_priority() {
        let base = Request::new("Explain ownership").with_task_type("conversation");
        let other = base
            .clone()
            .with_id("different")
            .with_user("user_456")
            .with_priority(5)
            .with_context_entry("session", json!("abc"));
        assert_eq!(fingerprint(&base), fingerprint(&other));
    }

    #[test]
    fn test_fingerprint_separates_relevant_fields() {
        let base = Request::new("Explain ownership");
        assert_ne!(
            fingerprint(&base),
            fingerprint(&base.clone().with_complexity(Complexity::Complex))
        );
        assert_ne!(
            fingerprint(&base),
            fingerprint(&base.clone().with_task_type("analysis"))
        );

        let split_one = Request::new("ab").with_task_type("c");
        let split_two = Request::new("a").with_task_type("bc");
        assert_ne!(fingerprint(&split_one), fingerprint(&split_two));
    }
}
