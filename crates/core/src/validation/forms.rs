use serde::Deserialize;

use super::rules::{self, RuleResult};
use super::ValidationErrors;
use crate::models::{Category, ErrorReport, NewCategory, NewCommunity, NewWithdrawal};

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 2000;
pub const CATEGORY_NAME_MAX: usize = 50;
pub const REPORT_DETAILS_MAX: usize = 2000;

/// Collects the failures of every rule run against a form.
#[derive(Default)]
struct Checks {
    errors: ValidationErrors,
}

impl Checks {
    fn rule(&mut self, field: &'static str, result: RuleResult) -> bool {
        match result {
            Ok(()) => true,
            Err(message) => {
                self.errors.add(field, message);
                false
            }
        }
    }

    /// Run `rule` only if the field has no error yet.
    fn then(&mut self, field: &'static str, result: impl FnOnce() -> RuleResult) {
        if !self.errors.has(field) {
            self.rule(field, result());
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self.errors)
        }
    }
}

/// Community create/edit form, values as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub fee: String,
}

impl CommunityForm {
    /// The category must be one of `categories`, the current category set.
    pub fn validate(&self, categories: &[Category]) -> Result<NewCommunity, ValidationErrors> {
        let mut checks = Checks::default();

        checks.rule("name", rules::required(&self.name));
        checks.then("name", || rules::max_length(&self.name, NAME_MAX));

        checks.rule("description", rules::required(&self.description));
        checks.then("description", || {
            rules::max_length(&self.description, DESCRIPTION_MAX)
        });

        checks.rule("category", rules::required(&self.category));
        checks.then("category", || {
            if categories.iter().any(|c| c.name == self.category) {
                Ok(())
            } else {
                Err("Choose one of the listed categories".to_string())
            }
        });

        let fee = match rules::number_at_least(&self.fee, 0.0) {
            Ok(fee) => fee,
            Err(message) => {
                checks.errors.add("fee", message);
                0.0
            }
        };

        checks.finish(|| NewCommunity {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.clone(),
            fee,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<NewCategory, ValidationErrors> {
        let mut checks = Checks::default();
        checks.rule("name", rules::required(&self.name));
        checks.then("name", || rules::max_length(&self.name, CATEGORY_NAME_MAX));
        checks.finish(|| NewCategory {
            name: self.name.trim().to_string(),
        })
    }
}

/// Payout request form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawalForm {
    pub amount: String,
    pub email: String,
}

impl WithdrawalForm {
    /// `minimum` comes from configuration, `balance` from the profile.
    pub fn validate(&self, minimum: f64, balance: f64) -> Result<NewWithdrawal, ValidationErrors> {
        let mut checks = Checks::default();

        let amount = match rules::number_at_least(&self.amount, minimum) {
            Ok(amount) if amount > balance => {
                checks
                    .errors
                    .add("amount", format!("Exceeds your balance of {:.2}", balance));
                amount
            }
            Ok(amount) => amount,
            Err(message) => {
                checks.errors.add("amount", message);
                0.0
            }
        };

        checks.rule("email", rules::required(&self.email));
        checks.then("email", || rules::email(&self.email));

        checks.finish(|| NewWithdrawal {
            amount,
            email: self.email.trim().to_string(),
        })
    }
}

/// Free-text report from the recovery screen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorReportForm {
    pub message: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorReportForm {
    pub fn validate(&self) -> Result<ErrorReport, ValidationErrors> {
        let mut checks = Checks::default();

        checks.rule("message", rules::required(&self.message));
        checks.then("message", || rules::max_length(&self.message, NAME_MAX * 5));

        if let Some(path) = non_blank(&self.path) {
            // In-app path or full page URL.
            if !path.starts_with('/') {
                checks.rule("path", rules::url(path));
            }
        }
        if let Some(details) = non_blank(&self.details) {
            checks.rule("details", rules::max_length(details, REPORT_DETAILS_MAX));
        }

        checks.finish(|| ErrorReport {
            message: self.message.trim().to_string(),
            path: non_blank(&self.path).map(str::to_string),
            details: non_blank(&self.details).map(str::to_string),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
