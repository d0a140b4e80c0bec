use async_graphql::{Enum, ID, InputObject, SimpleObject};
use chrono::NaiveDate;
use products_hr::{
    Department, Employee, EmployeeForm, SortKey,
    views::{DepartmentAggregate, DepartmentAverage, MonthBucket, SummaryMetrics, department_share},
};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Employee")]
pub struct EmployeeNode {
    pub id: ID,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub salary: f64,
    pub date: NaiveDate,
    pub department: String,
    pub position: String,
    pub status: String,
    pub avatar: String,
}

impl From<Employee> for EmployeeNode {
    fn from(model: Employee) -> Self {
        Self {
            id: ID::from(model.id.to_string()),
            full_name: model.full_name(),
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            salary: model.salary,
            date: model.date,
            department: model.department.as_str().to_string(),
            position: model.position,
            status: model.status.as_str().to_string(),
            avatar: model.avatar,
        }
    }
}

/// Form values as typed by the user. Checked before anything is stored.
#[derive(InputObject, Clone, Debug, Default)]
#[graphql(name = "EmployeeInput")]
pub struct EmployeeInput {
    #[graphql(default)]
    pub first_name: String,
    #[graphql(default)]
    pub last_name: String,
    #[graphql(default)]
    pub email: String,
    #[graphql(default)]
    pub phone: String,
    #[graphql(default)]
    pub salary: String,
    #[graphql(default)]
    pub date: String,
    #[graphql(default)]
    pub department: String,
    #[graphql(default)]
    pub position: String,
}

impl From<EmployeeInput> for EmployeeForm {
    fn from(value: EmployeeInput) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            salary: value.salary,
            date: value.date,
            department: value.department,
            position: value.position,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum EmployeeSort {
    #[default]
    Name,
    Salary,
    Date,
    Department,
}

impl From<EmployeeSort> for SortKey {
    fn from(value: EmployeeSort) -> Self {
        match value {
            EmployeeSort::Name => SortKey::Name,
            EmployeeSort::Salary => SortKey::Salary,
            EmployeeSort::Date => SortKey::Date,
            EmployeeSort::Department => SortKey::Department,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct EmployeeViewInput {
    pub search: Option<String>,
    /// `All` or a department name.
    pub department: Option<String>,
    pub sort_by: Option<EmployeeSort>,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Department")]
pub struct DepartmentNode {
    pub name: String,
    pub positions: Vec<String>,
}

impl From<Department> for DepartmentNode {
    fn from(value: Department) -> Self {
        Self {
            name: value.as_str().to_string(),
            positions: value.positions().iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Summary")]
pub struct SummaryNode {
    pub total_employees: i32,
    pub total_salary: f64,
    pub average_salary: i64,
    pub departments: i32,
}

impl From<SummaryMetrics> for SummaryNode {
    fn from(value: SummaryMetrics) -> Self {
        Self {
            total_employees: value.total_employees as i32,
            total_salary: value.total_salary,
            average_salary: value.average_salary,
            departments: value.departments as i32,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i32,
    /// Rounded percentage of all employees.
    pub share: i32,
}

impl DepartmentCount {
    pub fn new(aggregate: &DepartmentAggregate, total: usize) -> Self {
        Self {
            department: aggregate.department.as_str().to_string(),
            count: aggregate.count as i32,
            share: department_share(aggregate.count, total) as i32,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentSalary {
    pub department: String,
    pub average_salary: i64,
    pub employee_count: i32,
}

impl From<&DepartmentAggregate> for DepartmentSalary {
    fn from(value: &DepartmentAggregate) -> Self {
        Self {
            department: value.department.as_str().to_string(),
            average_salary: value.average_salary(),
            employee_count: value.count as i32,
        }
    }
}

impl From<DepartmentAverage> for DepartmentSalary {
    fn from(value: DepartmentAverage) -> Self {
        Self {
            department: value.department.as_str().to_string(),
            average_salary: value.average_salary,
            employee_count: value.employee_count as i32,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct MonthlyHires {
    pub label: String,
    pub year: i32,
    pub month: i32,
    pub hires: i32,
}

impl From<MonthBucket> for MonthlyHires {
    fn from(value: MonthBucket) -> Self {
        Self {
            label: value.label(),
            year: value.year,
            month: value.month as i32,
            hires: value.hires as i32,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DashboardPayload {
    pub summary: SummaryNode,
    pub departments: Vec<DepartmentCount>,
    pub recent_hires: Vec<EmployeeNode>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AnalyticsPayload {
    pub reference_date: NaiveDate,
    pub summary: SummaryNode,
    pub distribution: Vec<DepartmentCount>,
    pub average_salaries: Vec<DepartmentSalary>,
    pub monthly_hires: Vec<MonthlyHires>,
    pub top_departments: Vec<DepartmentSalary>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeePayload {
    pub employee: EmployeeNode,
    /// False when the change could not be written to disk. It still applies
    /// for this session.
    pub persisted: bool,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DeletePayload {
    pub removed: bool,
    pub persisted: bool,
}
