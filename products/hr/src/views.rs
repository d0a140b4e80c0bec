//! Read-only projections over the employee collection: the list view's
//! search/filter/sort and the dashboard and analytics aggregates. None of these
//! mutate their input.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{catalog::Department, employee::Employee};

pub const RECENT_HIRES: usize = 5;
pub const TOP_DEPARTMENTS: usize = 3;
pub const HISTOGRAM_MONTHS: usize = 12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Salary,
    Date,
    Department,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(Department),
}

impl DepartmentFilter {
    pub fn matches(self, department: Department) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Only(only) => only == department,
        }
    }
}

impl fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartmentFilter::All => f.write_str("All"),
            DepartmentFilter::Only(dept) => f.write_str(dept.as_str()),
        }
    }
}

impl FromStr for DepartmentFilter {
    type Err = crate::catalog::UnknownDepartment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            Ok(DepartmentFilter::All)
        } else {
            s.parse().map(DepartmentFilter::Only)
        }
    }
}

/// Search, filter and sort selections of the list view. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub department: DepartmentFilter,
    pub sort: SortKey,
}

/// Case-insensitive ordering; names equal apart from case put lowercase
/// first. Accented letters are not folded and sort after `z`.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn matches_search(employee: &Employee, needle: &str) -> bool {
    [
        employee.first_name.as_str(),
        employee.last_name.as_str(),
        employee.email.as_str(),
        employee.department.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

pub fn filtered_and_sorted(employees: &[Employee], view: &ViewState) -> Vec<Employee> {
    let needle = view.search.to_lowercase();
    let mut rows: Vec<Employee> = employees
        .iter()
        .filter(|e| matches_search(e, &needle))
        .filter(|e| view.department.matches(e.department))
        .cloned()
        .collect();
    match view.sort {
        SortKey::Name => rows.sort_by(|a, b| locale_cmp(&a.full_name(), &b.full_name())),
        SortKey::Salary => rows.sort_by(|a, b| b.salary.total_cmp(&a.salary)),
        SortKey::Date => rows.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::Department => {
            rows.sort_by(|a, b| locale_cmp(a.department.as_str(), b.department.as_str()))
        }
    }
    rows
}

/// `All` followed by the departments present, in first-seen order.
pub fn department_options(employees: &[Employee]) -> Vec<DepartmentFilter> {
    let mut options = vec![DepartmentFilter::All];
    for employee in employees {
        let option = DepartmentFilter::Only(employee.department);
        if !options.contains(&option) {
            options.push(option);
        }
    }
    options
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentAggregate {
    pub department: Department,
    pub count: usize,
    pub total_salary: f64,
}

impl DepartmentAggregate {
    pub fn average_salary(&self) -> i64 {
        if self.count == 0 {
            return 0;
        }
        (self.total_salary / self.count as f64).round() as i64
    }
}

/// Headcount and salary totals per department, in first-seen order.
pub fn aggregate_by_department(employees: &[Employee]) -> Vec<DepartmentAggregate> {
    let mut aggregates: Vec<DepartmentAggregate> = Vec::new();
    for employee in employees {
        match aggregates
            .iter_mut()
            .find(|agg| agg.department == employee.department)
        {
            Some(agg) => {
                agg.count += 1;
                agg.total_salary += employee.salary;
            }
            None => aggregates.push(DepartmentAggregate {
                department: employee.department,
                count: 1,
                total_salary: employee.salary,
            }),
        }
    }
    aggregates
}

/// Rounded percentage of `total` that `count` represents.
pub fn department_share(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentAverage {
    pub department: Department,
    pub average_salary: i64,
    pub employee_count: usize,
}

/// Highest average salary first. Equal averages keep first-seen order.
pub fn top_departments_by_salary(employees: &[Employee], n: usize) -> Vec<DepartmentAverage> {
    let mut averages: Vec<DepartmentAverage> = aggregate_by_department(employees)
        .into_iter()
        .map(|agg| DepartmentAverage {
            department: agg.department,
            average_salary: agg.average_salary(),
            employee_count: agg.count,
        })
        .collect();
    averages.sort_by(|a, b| b.average_salary.cmp(&a.average_salary));
    averages.truncate(n);
    averages
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub hires: u32,
}

impl MonthBucket {
    /// Short label such as `Apr 2019`.
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|first| first.format("%b %Y").to_string())
            .unwrap_or_default()
    }
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Hires per month for the twelve months ending with `reference`'s month,
/// oldest first. Hires outside the window are left out.
pub fn monthly_hire_histogram(employees: &[Employee], reference: NaiveDate) -> Vec<MonthBucket> {
    let last = month_index(reference);
    let first = last - (HISTOGRAM_MONTHS as i64 - 1);
    let mut buckets: Vec<MonthBucket> = (first..=last)
        .map(|index| MonthBucket {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
            hires: 0,
        })
        .collect();
    for employee in employees {
        let index = month_index(employee.date);
        if (first..=last).contains(&index) {
            buckets[(index - first) as usize].hires += 1;
        }
    }
    buckets
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_employees: usize,
    pub total_salary: f64,
    pub average_salary: i64,
    pub departments: usize,
}

pub fn summary_metrics(employees: &[Employee]) -> SummaryMetrics {
    let total_employees = employees.len();
    let total_salary: f64 = employees.iter().map(|e| e.salary).sum();
    let average_salary = if total_employees > 0 {
        (total_salary / total_employees as f64).round() as i64
    } else {
        0
    };
    SummaryMetrics {
        total_employees,
        total_salary,
        average_salary,
        departments: aggregate_by_department(employees).len(),
    }
}

/// Most recent hires first.
pub fn recent_hires(employees: &[Employee], n: usize) -> Vec<Employee> {
    let mut rows = employees.to_vec();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows.truncate(n);
    rows
}
