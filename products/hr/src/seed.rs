use chrono::NaiveDate;

use crate::{
    catalog::Department,
    employee::{Employee, EmployeeId, Status},
};

struct SeedRow {
    id: u32,
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    salary: f64,
    hired: (i32, u32, u32),
    department: Department,
    position: &'static str,
    phone: &'static str,
}

const SEED_ROWS: [SeedRow; 4] = [
    SeedRow {
        id: 1,
        first_name: "Susan",
        last_name: "Jordon",
        email: "susan@example.com",
        salary: 95_000.0,
        hired: (2019, 4, 11),
        department: Department::Engineering,
        position: "Senior Developer",
        phone: "+1-555-0123",
    },
    SeedRow {
        id: 2,
        first_name: "Adrienne",
        last_name: "Doak",
        email: "adrienne@example.com",
        salary: 80_000.0,
        hired: (2019, 4, 17),
        department: Department::Marketing,
        position: "Marketing Manager",
        phone: "+1-555-0124",
    },
    SeedRow {
        id: 3,
        first_name: "John",
        last_name: "Smith",
        email: "john@example.com",
        salary: 75_000.0,
        hired: (2019, 5, 1),
        department: Department::Sales,
        position: "Sales Representative",
        phone: "+1-555-0125",
    },
    SeedRow {
        id: 4,
        first_name: "Emily",
        last_name: "Johnson",
        email: "emily@example.com",
        salary: 85_000.0,
        hired: (2019, 6, 15),
        department: Department::Hr,
        position: "HR Specialist",
        phone: "+1-555-0126",
    },
];

/// Sample records used when nothing usable is stored.
pub fn seed_employees() -> Vec<Employee> {
    SEED_ROWS
        .iter()
        .filter_map(|row| {
            let (year, month, day) = row.hired;
            Some(Employee {
                id: EmployeeId(row.id),
                first_name: row.first_name.to_string(),
                last_name: row.last_name.to_string(),
                email: row.email.to_string(),
                salary: row.salary,
                date: NaiveDate::from_ymd_opt(year, month, day)?,
                department: row.department,
                position: row.position.to_string(),
                phone: row.phone.to_string(),
                status: Status::Active,
                avatar: format!("https://i.pravatar.cc/150?img={}", row.id),
            })
        })
        .collect()
}
