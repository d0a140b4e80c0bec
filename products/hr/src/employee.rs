use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Department;

/// Registry-assigned identifier. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u32);

impl EmployeeId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "On Leave")]
    OnLeave,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::OnLeave => "On Leave",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored employee record. Field order matches the persisted layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub salary: f64,
    pub date: NaiveDate,
    pub department: Department,
    pub position: String,
    pub phone: String,
    pub status: Status,
    pub avatar: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Everything the caller supplies on create. `id`, `status` and `avatar` are
/// assigned by the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub salary: f64,
    pub date: NaiveDate,
    pub department: Department,
    pub position: String,
}

/// Partial update. `None` fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmployeePatch {
    pub id: Option<EmployeeId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<f64>,
    pub date: Option<NaiveDate>,
    pub department: Option<Department>,
    pub position: Option<String>,
    pub status: Option<Status>,
    pub avatar: Option<String>,
}

impl EmployeePatch {
    pub(crate) fn apply(self, target: &mut Employee) {
        if let Some(id) = self.id {
            target.id = id;
        }
        if let Some(first_name) = self.first_name {
            target.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            target.last_name = last_name;
        }
        if let Some(email) = self.email {
            target.email = email;
        }
        if let Some(phone) = self.phone {
            target.phone = phone;
        }
        if let Some(salary) = self.salary {
            target.salary = salary;
        }
        if let Some(date) = self.date {
            target.date = date;
        }
        if let Some(department) = self.department {
            target.department = department;
        }
        if let Some(position) = self.position {
            target.position = position;
        }
        if let Some(status) = self.status {
            target.status = status;
        }
        if let Some(avatar) = self.avatar {
            target.avatar = avatar;
        }
    }
}

/// The edit form always submits every form field.
impl From<NewEmployee> for EmployeePatch {
    fn from(value: NewEmployee) -> Self {
        Self {
            first_name: Some(value.first_name),
            last_name: Some(value.last_name),
            email: Some(value.email),
            phone: Some(value.phone),
            salary: Some(value.salary),
            date: Some(value.date),
            department: Some(value.department),
            position: Some(value.position),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Employee {
        Employee {
            id: EmployeeId(7),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            salary: 120_000.0,
            date: NaiveDate::from_ymd_opt(2021, 3, 9).unwrap(),
            department: Department::Hr,
            position: "Recruiter".into(),
            phone: "+1-555-0100".into(),
            status: Status::OnLeave,
            avatar: "https://i.pravatar.cc/150?img=7".into(),
        }
    }

    #[test]
    fn serializes_with_storage_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "salary": 120000.0,
                "date": "2021-03-09",
                "department": "HR",
                "position": "Recruiter",
                "phone": "+1-555-0100",
                "status": "On Leave",
                "avatar": "https://i.pravatar.cc/150?img=7"
            })
        );
    }

    #[test]
    fn reads_integer_salaries() {
        let raw = r#"{"id":1,"firstName":"A","lastName":"B","email":"a@b.co","salary":95000,
            "date":"2019-04-11","department":"Engineering","position":"Tech Lead",
            "phone":"1","status":"Active","avatar":"x"}"#;
        let employee: Employee = serde_json::from_str(raw).unwrap();
        assert_eq!(employee.salary, 95_000.0);
        assert_eq!(employee.department, Department::Engineering);
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let mut employee = sample();
        EmployeePatch {
            salary: Some(130_000.0),
            ..EmployeePatch::default()
        }
        .apply(&mut employee);
        assert_eq!(employee.salary, 130_000.0);
        assert_eq!(employee.first_name, "Ada");
        assert_eq!(employee.avatar, "https://i.pravatar.cc/150?img=7");
        assert_eq!(employee.status, Status::OnLeave);
    }
}
