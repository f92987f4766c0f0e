use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{money_as_number, Money, Rate};
use crate::errors::{LendingError, Result};
use crate::types::LoanType;

/// in-progress loan application held by a wizard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    // personal
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,

    // financial
    pub employment_status: String,
    pub employer_name: String,
    #[serde(with = "money_as_number")]
    pub annual_income: Money,
    #[serde(with = "money_as_number")]
    pub monthly_debt: Money,
    /// self-reported, 300-850
    #[serde(rename = "creditScoreEst")]
    pub credit_score_estimate: u32,

    // loan
    pub loan_type: LoanType,
    #[serde(with = "money_as_number")]
    pub amount: Money,
    #[serde(rename = "term")]
    pub term_months: u32,
    pub purpose: String,
}

impl Default for LoanApplication {
    fn default() -> Self {
        Self::new(LoanType::default())
    }
}

impl LoanApplication {
    pub const DEFAULT_CREDIT_SCORE: u32 = 700;
    pub const DEFAULT_TERM_MONTHS: u32 = 24;
    pub const TERM_OPTIONS: [u32; 5] = [12, 24, 36, 48, 60];
    pub const CREDIT_SCORE_RANGE: (u32, u32) = (300, 850);

    /// empty draft with the form's initial values
    pub fn new(loan_type: LoanType) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            employment_status: "Employed".to_string(),
            employer_name: String::new(),
            annual_income: Money::ZERO,
            monthly_debt: Money::ZERO,
            credit_score_estimate: Self::DEFAULT_CREDIT_SCORE,
            loan_type,
            amount: Money::from_major(10_000),
            term_months: Self::DEFAULT_TERM_MONTHS,
            purpose: String::new(),
        }
    }

    /// set a single field, last write wins
    pub fn set_field(&mut self, field: ApplicationField, value: FieldValue) -> Result<()> {
        use ApplicationField as F;

        match (field, value) {
            (F::FirstName, FieldValue::Text(v)) => self.first_name = v,
            (F::LastName, FieldValue::Text(v)) => self.last_name = v,
            (F::Email, FieldValue::Text(v)) => self.email = v,
            (F::Phone, FieldValue::Text(v)) => self.phone = v,
            (F::Address, FieldValue::Text(v)) => self.address = v,
            (F::EmploymentStatus, FieldValue::Text(v)) => self.employment_status = v,
            (F::EmployerName, FieldValue::Text(v)) => self.employer_name = v,
            (F::Purpose, FieldValue::Text(v)) => self.purpose = v,
            (F::AnnualIncome, FieldValue::Amount(v)) => self.annual_income = v,
            (F::MonthlyDebt, FieldValue::Amount(v)) => self.monthly_debt = v,
            (F::Amount, FieldValue::Amount(v)) => self.amount = v,
            (F::CreditScoreEstimate, FieldValue::Count(v)) if Self::credit_score_in_range(v) => {
                self.credit_score_estimate = v
            }
            (F::TermMonths, FieldValue::Count(v)) => self.term_months = v,
            (F::LoanType, FieldValue::Loan(v)) => self.loan_type = v,
            (field, value) => {
                return Err(LendingError::InvalidFieldValue {
                    field: field.name().to_string(),
                    value: value.to_string(),
                })
            }
        }
        Ok(())
    }

    /// set a field from raw form input, coercing the text to the field's type
    ///
    /// The draft is left untouched when the name is unknown or the value
    /// does not parse.
    pub fn set_field_from_input(&mut self, name: &str, raw: &str) -> Result<ApplicationField> {
        let field: ApplicationField = name.parse()?;
        let value = field.parse_value(raw)?;
        self.set_field(field, value)?;
        Ok(field)
    }

    pub fn get_field(&self, field: ApplicationField) -> FieldValue {
        use ApplicationField as F;

        match field {
            F::FirstName => FieldValue::Text(self.first_name.clone()),
            F::LastName => FieldValue::Text(self.last_name.clone()),
            F::Email => FieldValue::Text(self.email.clone()),
            F::Phone => FieldValue::Text(self.phone.clone()),
            F::Address => FieldValue::Text(self.address.clone()),
            F::EmploymentStatus => FieldValue::Text(self.employment_status.clone()),
            F::EmployerName => FieldValue::Text(self.employer_name.clone()),
            F::Purpose => FieldValue::Text(self.purpose.clone()),
            F::AnnualIncome => FieldValue::Amount(self.annual_income),
            F::MonthlyDebt => FieldValue::Amount(self.monthly_debt),
            F::Amount => FieldValue::Amount(self.amount),
            F::CreditScoreEstimate => FieldValue::Count(self.credit_score_estimate),
            F::TermMonths => FieldValue::Count(self.term_months),
            F::LoanType => FieldValue::Loan(self.loan_type),
        }
    }

    /// whether `score` lies within `CREDIT_SCORE_RANGE`, bounds included
    pub fn credit_score_in_range(score: u32) -> bool {
        let (min, max) = Self::CREDIT_SCORE_RANGE;
        (min..=max).contains(&score)
    }

    pub fn applicant_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn monthly_income(&self) -> Money {
        self.annual_income / dec!(12)
    }

    /// monthly debt over monthly income, `None` while income is unknown
    pub fn debt_to_income(&self) -> Option<Rate> {
        let monthly_income = self.annual_income.as_decimal() / dec!(12);
        if monthly_income <= Decimal::ZERO {
            return None;
        }
        Some(Rate::from_decimal(
            (self.monthly_debt.as_decimal() / monthly_income).round_dp(4),
        ))
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// addressable fields of a loan application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    EmploymentStatus,
    EmployerName,
    AnnualIncome,
    MonthlyDebt,
    #[serde(rename = "creditScoreEst")]
    CreditScoreEstimate,
    LoanType,
    Amount,
    #[serde(rename = "term")]
    TermMonths,
    Purpose,
}

impl ApplicationField {
    pub const ALL: [ApplicationField; 14] = [
        ApplicationField::FirstName,
        ApplicationField::LastName,
        ApplicationField::Email,
        ApplicationField::Phone,
        ApplicationField::Address,
        ApplicationField::EmploymentStatus,
        ApplicationField::EmployerName,
        ApplicationField::AnnualIncome,
        ApplicationField::MonthlyDebt,
        ApplicationField::CreditScoreEstimate,
        ApplicationField::LoanType,
        ApplicationField::Amount,
        ApplicationField::TermMonths,
        ApplicationField::Purpose,
    ];

    /// form/wire name of the field
    pub fn name(&self) -> &'static str {
        match self {
            ApplicationField::FirstName => "firstName",
            ApplicationField::LastName => "lastName",
            ApplicationField::Email => "email",
            ApplicationField::Phone => "phone",
            ApplicationField::Address => "address",
            ApplicationField::EmploymentStatus => "employmentStatus",
            ApplicationField::EmployerName => "employerName",
            ApplicationField::AnnualIncome => "annualIncome",
            ApplicationField::MonthlyDebt => "monthlyDebt",
            ApplicationField::CreditScoreEstimate => "creditScoreEst",
            ApplicationField::LoanType => "loanType",
            ApplicationField::Amount => "amount",
            ApplicationField::TermMonths => "term",
            ApplicationField::Purpose => "purpose",
        }
    }

    /// coerce raw form text into this field's value type
    pub fn parse_value(&self, raw: &str) -> Result<FieldValue> {
        use ApplicationField as F;

        let invalid = || LendingError::InvalidFieldValue {
            field: self.name().to_string(),
            value: raw.to_string(),
        };

        match self {
            F::FirstName
            | F::LastName
            | F::Email
            | F::Phone
            | F::Address
            | F::EmploymentStatus
            | F::EmployerName
            | F::Purpose => Ok(FieldValue::Text(raw.to_string())),
            F::AnnualIncome | F::MonthlyDebt | F::Amount => {
                let cleaned: String = raw
                    .trim()
                    .chars()
                    .filter(|c| *c != '$' && *c != ',')
                    .collect();
                Money::from_str_exact(&cleaned)
                    .map(FieldValue::Amount)
                    .map_err(|_| invalid())
            }
            F::CreditScoreEstimate | F::TermMonths => raw
                .trim()
                .parse::<u32>()
                .map(FieldValue::Count)
                .map_err(|_| invalid()),
            F::LoanType => raw.parse::<LoanType>().map(FieldValue::Loan),
        }
    }
}

impl fmt::Display for ApplicationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApplicationField {
    type Err = LendingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ApplicationField::ALL
            .into_iter()
            .find(|f| f.name() == s.trim())
            .ok_or_else(|| LendingError::UnknownField {
                name: s.to_string(),
            })
    }
}

/// typed value for a single application field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Amount(Money),
    Count(u32),
    Loan(LoanType),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(v) => write!(f, "{}", v),
            FieldValue::Amount(v) => write!(f, "{}", v),
            FieldValue::Count(v) => write!(f, "{}", v),
            FieldValue::Loan(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Money> for FieldValue {
    fn from(v: Money) -> Self {
        FieldValue::Amount(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Count(v)
    }
}

impl From<LoanType> for FieldValue {
    fn from(v: LoanType) -> Self {
        FieldValue::Loan(v)
    }
}
