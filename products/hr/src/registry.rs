//! Sole owner of the employee collection. Every mutation is flushed to the
//! backing store before it returns.

use std::sync::Arc;

use platform_store::KeyValueStore;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    employee::{Employee, EmployeeId, EmployeePatch, NewEmployee, Status},
    persistence::{load_employees, save_employees},
    seed::seed_employees,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("employee {0} not found")]
    NotFound(EmployeeId),
    #[error("employee id {0} is already taken")]
    DuplicateId(EmployeeId),
    #[error("employee id {0} is not allowed")]
    InvalidId(EmployeeId),
    #[error("no employee ids left to assign")]
    IdSpaceExhausted,
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result of a mutation. `persisted` is false when the flush failed; the
/// in-memory change stands either way.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub persisted: bool,
}

pub struct EmployeeRegistry {
    employees: Vec<Employee>,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for EmployeeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmployeeRegistry")
            .field("employees", &self.employees.len())
            .finish_non_exhaustive()
    }
}

impl EmployeeRegistry {
    /// Loads the saved collection, falling back to the seed records when
    /// nothing usable is stored.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let employees = match load_employees(store.as_ref()) {
            Ok(Some(employees)) => {
                info!(count = employees.len(), "employee collection loaded");
                employees
            }
            Ok(None) => {
                info!("no saved employees; starting from seed records");
                seed_employees()
            }
            Err(err) => {
                warn!(error = %err, "saved employees unusable; starting from seed records");
                seed_employees()
            }
        };
        Self { employees, store }
    }

    /// Wraps an existing collection without touching the store.
    pub fn with_employees(store: Arc<dyn KeyValueStore>, employees: Vec<Employee>) -> Self {
        Self { employees, store }
    }

    pub fn list(&self) -> &[Employee] {
        &self.employees
    }

    pub fn get(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }

    /// One past the current maximum, so a freed top id is handed out again.
    pub fn next_id(&self) -> RegistryResult<EmployeeId> {
        let max = self.employees.iter().map(|e| e.id.get()).max().unwrap_or(0);
        max.checked_add(1)
            .map(EmployeeId)
            .ok_or(RegistryError::IdSpaceExhausted)
    }

    /// Callers validate the form first; only id assignment can fail here.
    pub fn create(&mut self, candidate: NewEmployee) -> RegistryResult<Mutation<Employee>> {
        let employee = Employee {
            id: self.next_id()?,
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            email: candidate.email,
            salary: candidate.salary,
            date: candidate.date,
            department: candidate.department,
            position: candidate.position,
            phone: candidate.phone,
            status: Status::Active,
            avatar: random_avatar(),
        };
        self.employees.push(employee.clone());
        info!(employee_id = %employee.id, department = %employee.department, "employee created");
        let persisted = self.flush();
        Ok(Mutation {
            value: employee,
            persisted,
        })
    }

    pub fn update(&mut self, id: EmployeeId, patch: EmployeePatch) -> RegistryResult<Mutation<Employee>> {
        let index = self
            .employees
            .iter()
            .position(|employee| employee.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        if let Some(new_id) = patch.id.filter(|new_id| *new_id != id) {
            if new_id.get() == 0 {
                return Err(RegistryError::InvalidId(new_id));
            }
            if self.get(new_id).is_some() {
                return Err(RegistryError::DuplicateId(new_id));
            }
        }
        let slot = &mut self.employees[index];
        patch.apply(slot);
        let employee = slot.clone();
        info!(employee_id = %id, "employee updated");
        let persisted = self.flush();
        Ok(Mutation {
            value: employee,
            persisted,
        })
    }

    /// Absent ids are a no-op. `value` reports whether a record was removed.
    pub fn delete(&mut self, id: EmployeeId) -> Mutation<bool> {
        let before = self.employees.len();
        self.employees.retain(|employee| employee.id != id);
        let removed = self.employees.len() != before;
        if removed {
            info!(employee_id = %id, "employee deleted");
        }
        let persisted = self.flush();
        Mutation {
            value: removed,
            persisted,
        }
    }

    /// Replaces the collection with the seed records.
    pub fn reset_to_seed(&mut self) -> Mutation<usize> {
        self.employees = seed_employees();
        info!(count = self.employees.len(), "employee collection reset to seed records");
        let persisted = self.flush();
        Mutation {
            value: self.employees.len(),
            persisted,
        }
    }

    fn flush(&self) -> bool {
        match save_employees(self.store.as_ref(), &self.employees) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to persist employees; keeping in-memory state");
                false
            }
        }
    }
}

fn random_avatar() -> String {
    let img = rand::thread_rng().gen_range(1..=70);
    format!("https://i.pravatar.cc/150?img={img}")
}
