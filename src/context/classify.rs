//! Keyword classification of raw error messages.
//!
//! Rules are checked in a fixed order and the first match wins:
//! authentication, validation, business logic, database, network,
//! configuration, then system as the fallback. A message naming several
//! kinds of failure is classified by whichever rule comes first.

use crate::context::{ErrorCategory, ErrorSeverity};

const RULES: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Authentication,
        &[
            "unauthorized",
            "unauthenticated",
            "authentication",
            "invalid token",
            "token expired",
            "expired token",
            "invalid credentials",
            "forbidden",
            "permission denied",
            "access denied",
        ],
    ),
    (
        ErrorCategory::Validation,
        &[
            "validation",
            "invalid",
            "required",
            "must be",
            "malformed",
            "out of range",
            "too long",
            "too short",
        ],
    ),
    (
        ErrorCategory::BusinessLogic,
        &[
            "insufficient funds",
            "insufficient balance",
            "limit exceeded",
            "not allowed",
            "already exists",
            "duplicate",
            "account frozen",
            "account closed",
        ],
    ),
    (
        ErrorCategory::Database,
        &[
            "database",
            "sql",
            "query",
            "deadlock",
            "constraint",
            "connection pool",
            "transaction",
            "no rows",
        ],
    ),
    (
        ErrorCategory::Network,
        &[
            "connection refused",
            "connection reset",
            "timed out",
            "timeout",
            "network",
            "dns",
            "unreachable",
            "broken pipe",
        ],
    ),
    (
        ErrorCategory::Configuration,
        &[
            "configuration",
            "config",
            "environment variable",
            "not configured",
            "missing setting",
        ],
    ),
];

const CRISIS_KEYWORDS: &[&str] = &["panic", "fatal", "corruption", "corrupted", "out of memory", "data loss"];

/// Category of a raw error message.
pub fn classify_message(message: &str) -> ErrorCategory {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map_or(ErrorCategory::System, |(category, _)| *category)
}

/// Severity for a category, raised to critical by crisis keywords.
pub fn severity_for(category: ErrorCategory, message: &str) -> ErrorSeverity {
    let lowered = message.to_lowercase();
    if CRISIS_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return ErrorSeverity::Critical;
    }
    match category {
        ErrorCategory::Validation => ErrorSeverity::Low,
        ErrorCategory::BusinessLogic
        | ErrorCategory::Network
        | ErrorCategory::ExternalService
        | ErrorCategory::Authentication => ErrorSeverity::Medium,
        ErrorCategory::Database | ErrorCategory::Configuration | ErrorCategory::System => {
            ErrorSeverity::High
        }
    }
}

/// Category and severity of a raw error message.
pub fn classify(message: &str) -> (ErrorCategory, ErrorSeverity) {
    let category = classify_message(message);
    (category, severity_for(category, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_rule() {
        let cases = [
            ("Unauthorized: missing bearer", ErrorCategory::Authentication),
            ("email must be a valid address", ErrorCategory::Validation),
            ("insufficient funds in account 42", ErrorCategory::BusinessLogic),
            ("deadlock detected while updating balances", ErrorCategory::Database),
            ("dial tcp: connection refused", ErrorCategory::Network),
            ("DATABASE_URL environment variable not set", ErrorCategory::Database),
            ("smtp host not configured", ErrorCategory::Configuration),
            ("something odd happened", ErrorCategory::System),
        ];
        for (message, expected) in cases {
            assert_eq!(classify_message(message), expected, "message: {}", message);
        }
    }

    #[test]
    fn test_priority_order_wins() {
        // Mentions both a token problem and validation.
        assert_eq!(
            classify_message("validation failed: invalid token"),
            ErrorCategory::Authentication
        );
        // Mentions both a query and a timeout.
        assert_eq!(classify_message("query timeout"), ErrorCategory::Database);
    }

    #[test]
    fn test_crisis_keywords_force_critical() {
        assert_eq!(
            classify("invalid amount caused ledger corruption"),
            (ErrorCategory::Validation, ErrorSeverity::Critical)
        );
        assert_eq!(
            classify("worker panic: index out of bounds"),
            (ErrorCategory::System, ErrorSeverity::Critical)
        );
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(classify("field is required").1, ErrorSeverity::Low);
        assert_eq!(classify("network unreachable").1, ErrorSeverity::Medium);
        assert_eq!(classify("sql syntax error").1, ErrorSeverity::High);
        assert_eq!(classify("weird").1, ErrorSeverity::High);
    }
}
