//! Field-level checks for the add/edit form. Every rule runs on every call so
//! the caller can surface all problems at once.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{catalog::Department, employee::NewEmployee};

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email pattern"));

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Salary,
    Date,
    Department,
    Position,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Salary,
        Field::Date,
        Field::Department,
        Field::Position,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Salary => "salary",
            Field::Date => "date",
            Field::Department => "department",
            Field::Position => "position",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown form field {s}"))
    }
}

/// Field name to message. Empty means the form is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    pub(crate) fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub(crate) fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    fn single(field: Field, message: &str) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Form values exactly as submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub salary: String,
    pub date: String,
    pub department: String,
    pub position: String,
}

impl EmployeeForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Salary => &self.salary,
            Field::Date => &self.date,
            Field::Department => &self.department,
            Field::Position => &self.position,
        }
    }

    pub(crate) fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Salary => &mut self.salary,
            Field::Date => &mut self.date,
            Field::Department => &mut self.department,
            Field::Position => &mut self.position,
        }
    }

    /// Validates and converts into a typed create candidate.
    pub fn into_candidate(self) -> Result<NewEmployee, FieldErrors> {
        let errors = validate(&self);
        if !errors.is_empty() {
            return Err(errors);
        }
        let salary = parse_salary(&self.salary)
            .ok_or_else(|| FieldErrors::single(Field::Salary, SALARY_INVALID))?;
        let date = parse_date(&self.date)
            .ok_or_else(|| FieldErrors::single(Field::Date, DATE_INVALID))?;
        let department = self
            .department
            .parse::<Department>()
            .map_err(|_| FieldErrors::single(Field::Department, DEPARTMENT_REQUIRED))?;
        Ok(NewEmployee {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            salary,
            date,
            department,
            position: self.position,
        })
    }
}

const SALARY_INVALID: &str = "Salary must be a positive number";
const DATE_INVALID: &str = "Hire date is invalid";
const DEPARTMENT_REQUIRED: &str = "Department is required";

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn parse_salary(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value)
}

pub fn validate(form: &EmployeeForm) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if is_blank(&form.first_name) {
        errors.insert(Field::FirstName, "First name is required");
    }
    if is_blank(&form.last_name) {
        errors.insert(Field::LastName, "Last name is required");
    }

    if is_blank(&form.email) {
        errors.insert(Field::Email, "Email is required");
    } else if !is_valid_email(&form.email) {
        errors.insert(Field::Email, "Email is invalid");
    }

    if is_blank(&form.phone) {
        errors.insert(Field::Phone, "Phone number is required");
    }

    if is_blank(&form.salary) {
        errors.insert(Field::Salary, "Salary is required");
    } else if parse_salary(&form.salary).is_none() {
        errors.insert(Field::Salary, SALARY_INVALID);
    }

    if is_blank(&form.date) {
        errors.insert(Field::Date, "Hire date is required");
    } else if parse_date(&form.date).is_none() {
        errors.insert(Field::Date, DATE_INVALID);
    }

    if form.department.parse::<Department>().is_err() {
        errors.insert(Field::Department, DEPARTMENT_REQUIRED);
    }

    if is_blank(&form.position) {
        errors.insert(Field::Position, "Position is required");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> EmployeeForm {
        EmployeeForm {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            phone: "+1-555-0199".into(),
            salary: "105000.50".into(),
            date: "2024-02-29".into(),
            department: "Engineering".into(),
            position: "Tech Lead".into(),
        }
    }

    #[test]
    fn complete_form_has_no_errors() {
        assert!(validate(&complete_form()).is_empty());
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = validate(&EmployeeForm::default());
        assert_eq!(errors.fields().collect::<Vec<_>>(), Field::ALL.to_vec());
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(errors.get(Field::Date), Some("Hire date is required"));
    }

    #[test]
    fn only_violated_fields_are_reported() {
        let form = EmployeeForm {
            last_name: "   ".into(),
            phone: String::new(),
            ..complete_form()
        };
        let errors = validate(&form);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![Field::LastName, Field::Phone]
        );
    }

    #[test]
    fn email_shape() {
        for ok in ["a@b.c", "first.last@sub.example.org", "x y@z.w"] {
            assert!(is_valid_email(ok), "{ok}");
        }
        for bad in ["plain", "a@b", "@b.c", "a@.c", "a@b.", "a @b.c"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
        let errors = validate(&EmployeeForm {
            email: "nobody".into(),
            ..complete_form()
        });
        assert_eq!(errors.get(Field::Email), Some("Email is invalid"));
    }

    #[test]
    fn salary_must_be_positive_number() {
        for bad in ["0", "-10", "abc", "12abc", "inf", "NaN"] {
            let errors = validate(&EmployeeForm {
                salary: bad.into(),
                ..complete_form()
            });
            assert_eq!(errors.get(Field::Salary), Some(SALARY_INVALID), "{bad}");
        }
        let errors = validate(&EmployeeForm {
            salary: " ".into(),
            ..complete_form()
        });
        assert_eq!(errors.get(Field::Salary), Some("Salary is required"));
    }

    #[test]
    fn department_must_come_from_catalog() {
        let errors = validate(&EmployeeForm {
            department: "Legal".into(),
            ..complete_form()
        });
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Field::Department));
    }

    #[test]
    fn position_is_not_cross_checked() {
        let form = EmployeeForm {
            department: "Sales".into(),
            position: "Tech Lead".into(),
            ..complete_form()
        };
        assert!(validate(&form).is_empty());
    }

    #[test]
    fn malformed_date_is_rejected() {
        let errors = validate(&EmployeeForm {
            date: "2023-02-30".into(),
            ..complete_form()
        });
        assert_eq!(errors.get(Field::Date), Some(DATE_INVALID));
    }

    #[test]
    fn into_candidate_parses_typed_values() {
        let candidate = complete_form().into_candidate().unwrap();
        assert_eq!(candidate.salary, 105_000.5);
        assert_eq!(candidate.department, Department::Engineering);
        assert_eq!(candidate.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn into_candidate_returns_all_errors() {
        let errors = EmployeeForm {
            first_name: String::new(),
            salary: "-1".into(),
            ..complete_form()
        }
        .into_candidate()
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string(), "firstName: First name is required; salary: Salary must be a positive number");
    }
}
