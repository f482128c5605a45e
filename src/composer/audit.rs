//! Audit trail records.
//!
//! Every record carries `log_type=audit` and an `audit_event` naming the kind
//! of action. Success flags pick the level: info on success, warn on failure.
//! Amounts are written as two-decimal strings.

use rust_decimal::Decimal;

use crate::composer::amount::format_amount;
use crate::context::ErrorSeverity;
use crate::logging::{EventBuilder, Fields, Level, LogType, Logger};

fn outcome_level(success: bool) -> Level {
    if success {
        Level::Info
    } else {
        Level::Warn
    }
}

/// A completed or rejected transfer between two accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord<'a> {
    pub transfer_id: &'a str,
    pub user_id: &'a str,
    pub from_account: &'a str,
    pub to_account: &'a str,
    pub amount: Decimal,
    pub currency: &'a str,
    pub success: bool,
    /// Rejection reason, left out when empty.
    pub reason: &'a str,
}

/// Writes audit records through a [`Logger`].
#[derive(Debug, Clone)]
pub struct AuditLogger {
    logger: Logger,
}

impl AuditLogger {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    #[track_caller]
    fn record(&self, level: Level, event: &'static str) -> EventBuilder<'_> {
        self.logger
            .event(level)
            .log_type(LogType::Audit)
            .field("audit_event", event)
    }

    #[track_caller]
    pub fn log_authentication(
        &self,
        user_id: &str,
        email: &str,
        method: &str,
        success: bool,
        client_ip: &str,
    ) {
        self.record(outcome_level(success), "authentication")
            .str_field("user_id", user_id)
            .str_field("user_email", email)
            .field("auth_method", method)
            .field("success", success)
            .str_field("client_ip", client_ip)
            .msg("User authentication");
    }

    #[track_caller]
    pub fn log_authorization(&self, user_id: &str, resource: &str, action: &str, granted: bool) {
        self.record(outcome_level(granted), "authorization")
            .field("user_id", user_id)
            .field("resource", resource)
            .field("action", action)
            .field("granted", granted)
            .msg("Authorization decision");
    }

    #[track_caller]
    pub fn log_account_creation(
        &self,
        user_id: &str,
        account_id: &str,
        account_type: &str,
        initial_balance: Decimal,
        currency: &str,
    ) {
        self.record(Level::Info, "account_creation")
            .field("user_id", user_id)
            .field("account_id", account_id)
            .field("account_type", account_type)
            .field("initial_balance", format_amount(initial_balance))
            .field("currency", currency)
            .msg("Account created");
    }

    #[track_caller]
    pub fn log_account_update(&self, user_id: &str, account_id: &str, changes: Fields) {
        self.record(Level::Info, "account_update")
            .field("user_id", user_id)
            .field("account_id", account_id)
            .field("changes", changes)
            .msg("Account updated");
    }

    #[track_caller]
    pub fn log_transfer(&self, transfer: &TransferRecord<'_>) {
        self.record(outcome_level(transfer.success), "transfer")
            .field("transfer_id", transfer.transfer_id)
            .field("user_id", transfer.user_id)
            .field("from_account", transfer.from_account)
            .field("to_account", transfer.to_account)
            .field("amount", format_amount(transfer.amount))
            .field("currency", transfer.currency)
            .field("success", transfer.success)
            .str_field("reason", transfer.reason)
            .msg("Funds transfer");
    }

    #[track_caller]
    pub fn log_balance_change(
        &self,
        account_id: &str,
        previous: Decimal,
        current: Decimal,
        reason: &str,
    ) {
        self.record(Level::Info, "balance_change")
            .field("account_id", account_id)
            .field("previous_balance", format_amount(previous))
            .field("new_balance", format_amount(current))
            .field("change", format_amount(current - previous))
            .field("reason", reason)
            .msg("Balance changed");
    }

    #[track_caller]
    pub fn log_admin_action(&self, admin_id: &str, action: &str, target: &str, details: Fields) {
        let builder = self
            .record(Level::Info, "admin_action")
            .field("admin_id", admin_id)
            .field("action", action)
            .str_field("target", target);
        let builder = if details.is_empty() {
            builder
        } else {
            builder.field("details", details)
        };
        builder.msg("Admin action");
    }

    #[track_caller]
    pub fn log_data_access(&self, user_id: &str, resource: &str, resource_id: &str, action: &str) {
        self.record(Level::Info, "data_access")
            .field("user_id", user_id)
            .field("resource", resource)
            .str_field("resource_id", resource_id)
            .field("action", action)
            .msg("Data accessed");
    }

    /// Security-relevant event; the level follows `severity`.
    #[track_caller]
    pub fn log_security_event(
        &self,
        event_type: &str,
        severity: ErrorSeverity,
        description: &str,
        details: Fields,
    ) {
        let builder = self
            .record(severity.level(), "security_event")
            .field("event_type", event_type)
            .field("severity", severity.as_str())
            .field("description", description);
        let builder = if details.is_empty() {
            builder
        } else {
            builder.field("details", details)
        };
        builder.msg("Security event");
    }

    #[track_caller]
    pub fn log_configuration_change(
        &self,
        changed_by: &str,
        setting: &str,
        old_value: &str,
        new_value: &str,
    ) {
        self.record(Level::Info, "configuration_change")
            .field("changed_by", changed_by)
            .field("setting", setting)
            .field("old_value", old_value)
            .field("new_value", new_value)
            .msg("Configuration changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    use crate::logging::{BufferWriter, FieldValue};

    fn audit() -> (AuditLogger, BufferWriter) {
        let buf = BufferWriter::new();
        let logger = Logger::new(Arc::new(buf.clone()), Level::Debug);
        (AuditLogger::new(logger), buf)
    }

    #[test]
    fn test_authentication_levels() {
        let (audit, buf) = audit();
        audit.log_authentication("u-1", "a@example.com", "password", true, "10.0.0.1");
        audit.log_authentication("u-1", "", "password", false, "");

        let lines = buf.json_lines();
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["log_type"], "audit");
        assert_eq!(lines[0]["audit_event"], "authentication");
        assert_eq!(lines[0]["user_email"], "a@example.com");
        assert_eq!(lines[1]["level"], "warn");
        assert_eq!(lines[1]["success"], false);
        assert!(lines[1].get("user_email").is_none());
    }

    #[test]
    fn test_transfer_amount_is_fixed_point() {
        let (audit, buf) = audit();
        audit.log_transfer(&TransferRecord {
            transfer_id: "t-9",
            user_id: "u-1",
            from_account: "acc-1",
            to_account: "acc-2",
            amount: Decimal::from_str("100.005").unwrap(),
            currency: "USD",
            success: true,
            reason: "",
        });

        let line = &buf.json_lines()[0];
        assert_eq!(line["message"], "Funds transfer");
        assert_eq!(line["amount"], "100.01");
        assert_eq!(line["currency"], "USD");
        assert!(line.get("reason").is_none());
    }

    #[test]
    fn test_balance_change_reports_delta() {
        let (audit, buf) = audit();
        audit.log_balance_change(
            "acc-1",
            Decimal::from_str("50.5").unwrap(),
            Decimal::from_str("40").unwrap(),
            "withdrawal",
        );

        let line = &buf.json_lines()[0];
        assert_eq!(line["previous_balance"], "50.50");
        assert_eq!(line["new_balance"], "40.00");
        assert_eq!(line["change"], "-10.50");
    }

    #[test]
    fn test_security_event_level_follows_severity() {
        let (audit, buf) = audit();
        let mut details = Fields::new();
        details.insert("attempts".into(), FieldValue::from(12u32));
        audit.log_security_event("brute_force", ErrorSeverity::Critical, "Repeated login failures", details);

        let line = &buf.json_lines()[0];
        assert_eq!(line["level"], "fatal");
        assert_eq!(line["severity"], "critical");
        assert_eq!(line["details"]["attempts"], 12);
    }

    #[test]
    fn test_admin_and_config_records() {
        let (audit, buf) = audit();
        audit.log_admin_action("admin-1", "freeze_account", "acc-7", Fields::new());
        audit.log_configuration_change("admin-1", "max_transfer", "1000", "5000");
        audit.log_data_access("u-1", "statement", "", "export");

        let lines = buf.json_lines();
        assert_eq!(lines[0]["action"], "freeze_account");
        assert!(lines[0].get("details").is_none());
        assert_eq!(lines[1]["new_value"], "5000");
        assert_eq!(lines[2]["audit_event"], "data_access");
        assert!(lines[2].get("resource_id").is_none());
    }
}
