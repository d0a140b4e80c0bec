//! HR vertical slice: the employee registry, its form validation rules and the
//! derived views the dashboard renders.

pub mod catalog;
pub mod employee;
pub mod form;
pub mod persistence;
pub mod registry;
pub mod seed;
pub mod validation;
pub mod views;

pub use catalog::{Department, UnknownDepartment};
pub use employee::{Employee, EmployeeId, EmployeePatch, NewEmployee, Status};
pub use form::FormDraft;
pub use persistence::{PersistenceError, STORAGE_KEY};
pub use registry::{EmployeeRegistry, Mutation, RegistryError, RegistryResult};
pub use validation::{EmployeeForm, Field, FieldErrors, validate};
pub use views::{DepartmentFilter, SortKey, ViewState};
