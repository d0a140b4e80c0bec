use crate::{
    catalog::Department,
    employee::{Employee, NewEmployee},
    validation::{EmployeeForm, Field, FieldErrors},
};

/// Editable state behind the add/edit form.
#[derive(Clone, Debug, Default)]
pub struct FormDraft {
    form: EmployeeForm,
    errors: FieldErrors,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefills every form field from an existing record.
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            form: EmployeeForm {
                first_name: employee.first_name.clone(),
                last_name: employee.last_name.clone(),
                email: employee.email.clone(),
                phone: employee.phone.clone(),
                salary: employee.salary.to_string(),
                date: employee.date.format("%Y-%m-%d").to_string(),
                department: employee.department.as_str().to_string(),
                position: employee.position.clone(),
            },
            errors: FieldErrors::default(),
        }
    }

    pub fn form(&self) -> &EmployeeForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Editing a field clears its error. Changing the department also clears
    /// the position since the choices no longer apply.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.form.value_mut(field) = value.into();
        self.errors.clear(field);
        if field == Field::Department {
            self.form.position.clear();
        }
    }

    pub fn department(&self) -> Option<Department> {
        self.form.department.parse().ok()
    }

    /// Empty until a department is chosen.
    pub fn position_options(&self) -> &'static [&'static str] {
        self.department().map(Department::positions).unwrap_or(&[])
    }

    /// Runs validation and keeps the errors for display when it fails.
    pub fn submit(&mut self) -> Result<NewEmployee, FieldErrors> {
        match self.form.clone().into_candidate() {
            Ok(candidate) => {
                self.errors = FieldErrors::default();
                Ok(candidate)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }
}
