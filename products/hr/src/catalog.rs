//! Fixed department list and the positions each department offers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Engineering,
    Marketing,
    Sales,
    #[serde(rename = "HR")]
    Hr,
    Finance,
    Operations,
    Design,
    Product,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown department {0:?}")]
pub struct UnknownDepartment(pub String);

impl Department {
    pub const ALL: [Department; 8] = [
        Department::Engineering,
        Department::Marketing,
        Department::Sales,
        Department::Hr,
        Department::Finance,
        Department::Operations,
        Department::Design,
        Department::Product,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Marketing => "Marketing",
            Department::Sales => "Sales",
            Department::Hr => "HR",
            Department::Finance => "Finance",
            Department::Operations => "Operations",
            Department::Design => "Design",
            Department::Product => "Product",
        }
    }

    /// Positions offered for this department, in display order.
    pub fn positions(self) -> &'static [&'static str] {
        match self {
            Department::Engineering => &[
                "Software Engineer",
                "Senior Developer",
                "Tech Lead",
                "DevOps Engineer",
            ],
            Department::Marketing => &[
                "Marketing Manager",
                "Content Writer",
                "SEO Specialist",
                "Brand Manager",
            ],
            Department::Sales => &[
                "Sales Representative",
                "Sales Manager",
                "Account Executive",
                "Business Development",
            ],
            Department::Hr => &[
                "HR Specialist",
                "HR Manager",
                "Recruiter",
                "Training Coordinator",
            ],
            Department::Finance => &[
                "Financial Analyst",
                "Accountant",
                "Finance Manager",
                "Controller",
            ],
            Department::Operations => &[
                "Operations Manager",
                "Project Manager",
                "Business Analyst",
                "Process Manager",
            ],
            Department::Design => &[
                "UI/UX Designer",
                "Graphic Designer",
                "Product Designer",
                "Creative Director",
            ],
            Department::Product => &[
                "Product Manager",
                "Product Owner",
                "Product Analyst",
                "Product Director",
            ],
        }
    }

    pub fn offers(self, position: &str) -> bool {
        self.positions().contains(&position)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match on the display name.
impl FromStr for Department {
    type Err = UnknownDepartment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|dept| dept.as_str() == s)
            .ok_or_else(|| UnknownDepartment(s.to_string()))
    }
}
