mod employees;
mod me;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use async_graphql::{Context, EmptySubscription, Error, ErrorExtensions, ID, Object, Schema};
use chrono::{Local, NaiveDate};
use platform_api::{ApiError, internal_error};
use products_hr::{
    Department, DepartmentFilter, EmployeeForm, EmployeeId, EmployeePatch, EmployeeRegistry,
    FieldErrors, RegistryError, ViewState,
    views::{
        RECENT_HIRES, TOP_DEPARTMENTS, aggregate_by_department, department_options,
        filtered_and_sorted, monthly_hire_histogram, recent_hires, summary_metrics,
        top_departments_by_salary,
    },
};
use tracing::instrument;

pub use employees::{
    AnalyticsPayload, DashboardPayload, DeletePayload, DepartmentCount, DepartmentNode,
    DepartmentSalary, EmployeeInput, EmployeeNode, EmployeePayload, EmployeeSort,
    EmployeeViewInput, MonthlyHires, SummaryNode,
};
pub use me::Viewer;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// The registry is shared by every request; each mutation and its flush run
/// under this one lock.
pub type SharedRegistry = Arc<Mutex<EmployeeRegistry>>;

#[derive(Clone)]
pub struct GraphqlData {
    pub registry: SharedRegistry,
}

pub fn build_schema(data: GraphqlData) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(data.registry)
        .finish()
}

#[derive(Default)]
pub struct QueryRoot;

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.me", skip_all)]
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<Viewer> {
        ctx.data::<Viewer>()
            .cloned()
            .map_err(|_| ApiError::Unauthorized.extend())
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// The list view: search, department filter and sort applied.
    #[instrument(name = "graphql.employees", skip_all)]
    async fn employees(
        &self,
        ctx: &Context<'_>,
        view: Option<EmployeeViewInput>,
    ) -> async_graphql::Result<Vec<EmployeeNode>> {
        let view = view_state(view.unwrap_or_default())?;
        let registry = lock_registry(ctx)?;
        Ok(filtered_and_sorted(registry.list(), &view)
            .into_iter()
            .map(EmployeeNode::from)
            .collect())
    }

    #[instrument(name = "graphql.employee", skip_all)]
    async fn employee(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<EmployeeNode>> {
        let id = parse_id(&id)?;
        let registry = lock_registry(ctx)?;
        Ok(registry.get(id).cloned().map(EmployeeNode::from))
    }

    /// Every department with the positions the form offers for it.
    async fn departments(&self) -> Vec<DepartmentNode> {
        Department::ALL.into_iter().map(DepartmentNode::from).collect()
    }

    /// Filter choices for the list view: `All` plus departments in use.
    async fn department_options(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        let registry = lock_registry(ctx)?;
        Ok(department_options(registry.list())
            .into_iter()
            .map(|option| option.to_string())
            .collect())
    }

    #[instrument(name = "graphql.dashboard", skip_all)]
    async fn dashboard(&self, ctx: &Context<'_>) -> async_graphql::Result<DashboardPayload> {
        let registry = lock_registry(ctx)?;
        let employees = registry.list();
        let total = employees.len();
        Ok(DashboardPayload {
            summary: summary_metrics(employees).into(),
            departments: aggregate_by_department(employees)
                .iter()
                .map(|agg| DepartmentCount::new(agg, total))
                .collect(),
            recent_hires: recent_hires(employees, RECENT_HIRES)
                .into_iter()
                .map(EmployeeNode::from)
                .collect(),
        })
    }

    /// Defaults to today when no reference date is given.
    #[instrument(name = "graphql.analytics", skip_all)]
    async fn analytics(
        &self,
        ctx: &Context<'_>,
        reference_date: Option<NaiveDate>,
    ) -> async_graphql::Result<AnalyticsPayload> {
        let reference_date = reference_date.unwrap_or_else(|| Local::now().date_naive());
        let registry = lock_registry(ctx)?;
        let employees = registry.list();
        let total = employees.len();
        let aggregates = aggregate_by_department(employees);
        Ok(AnalyticsPayload {
            reference_date,
            summary: summary_metrics(employees).into(),
            distribution: aggregates
                .iter()
                .map(|agg| DepartmentCount::new(agg, total))
                .collect(),
            average_salaries: aggregates.iter().map(DepartmentSalary::from).collect(),
            monthly_hires: monthly_hire_histogram(employees, reference_date)
                .into_iter()
                .map(MonthlyHires::from)
                .collect(),
            top_departments: top_departments_by_salary(employees, TOP_DEPARTMENTS)
                .into_iter()
                .map(DepartmentSalary::from)
                .collect(),
        })
    }
}

#[Object]
impl MutationRoot {
    #[instrument(name = "graphql.create_employee", skip_all)]
    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        input: EmployeeInput,
    ) -> async_graphql::Result<EmployeePayload> {
        let candidate = EmployeeForm::from(input)
            .into_candidate()
            .map_err(validation_error)?;
        let outcome = mutate_registry(ctx, move |registry| registry.create(candidate))
            .await?
            .map_err(registry_error)?;
        Ok(EmployeePayload {
            employee: outcome.value.into(),
            persisted: outcome.persisted,
        })
    }

    /// Replaces every form field; status and avatar are kept.
    #[instrument(name = "graphql.update_employee", skip_all)]
    async fn update_employee(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: EmployeeInput,
    ) -> async_graphql::Result<EmployeePayload> {
        let id = parse_id(&id)?;
        let candidate = EmployeeForm::from(input)
            .into_candidate()
            .map_err(validation_error)?;
        let patch = EmployeePatch::from(candidate);
        let outcome = mutate_registry(ctx, move |registry| registry.update(id, patch))
            .await?
            .map_err(registry_error)?;
        Ok(EmployeePayload {
            employee: outcome.value.into(),
            persisted: outcome.persisted,
        })
    }

    /// Unknown ids are not an error; `removed` is false then.
    #[instrument(name = "graphql.delete_employee", skip_all)]
    async fn delete_employee(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<DeletePayload> {
        let id = parse_id(&id)?;
        let outcome = mutate_registry(ctx, move |registry| registry.delete(id)).await?;
        Ok(DeletePayload {
            removed: outcome.value,
            persisted: outcome.persisted,
        })
    }
}

fn lock_registry<'c>(ctx: &'c Context<'_>) -> async_graphql::Result<MutexGuard<'c, EmployeeRegistry>> {
    let shared = ctx.data::<SharedRegistry>()?;
    shared
        .lock()
        .map_err(|_| internal_error(anyhow!("employee registry lock poisoned")))
}

/// Runs a mutation and its file flush on the blocking pool.
async fn mutate_registry<T, F>(ctx: &Context<'_>, op: F) -> async_graphql::Result<T>
where
    F: FnOnce(&mut EmployeeRegistry) -> T + Send + 'static,
    T: Send + 'static,
{
    let shared = ctx.data::<SharedRegistry>()?.clone();
    tokio::task::spawn_blocking(move || {
        let mut registry = shared
            .lock()
            .map_err(|_| anyhow!("employee registry lock poisoned"))?;
        Ok::<_, anyhow::Error>(op(&mut registry))
    })
    .await
    .map_err(internal_error)?
    .map_err(internal_error)
}

fn parse_id(id: &ID) -> async_graphql::Result<EmployeeId> {
    id.as_str()
        .parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .map(EmployeeId)
        .ok_or_else(|| ApiError::InvalidInput(format!("invalid employee id {}", id.as_str())).extend())
}

fn view_state(input: EmployeeViewInput) -> async_graphql::Result<ViewState> {
    let department = match input.department.as_deref() {
        None => DepartmentFilter::All,
        Some(raw) => raw
            .parse::<DepartmentFilter>()
            .map_err(|err| ApiError::InvalidInput(err.to_string()).extend())?,
    };
    Ok(ViewState {
        search: input.search.unwrap_or_default(),
        department,
        sort: input.sort_by.unwrap_or_default().into(),
    })
}

fn validation_error(errors: FieldErrors) -> Error {
    ApiError::validation(errors.iter().map(|(field, message)| (field.as_str(), message))).extend()
}

fn registry_error(err: RegistryError) -> Error {
    match err {
        RegistryError::NotFound(_) => ApiError::NotFound.extend(),
        RegistryError::DuplicateId(_) | RegistryError::InvalidId(_) => {
            ApiError::InvalidInput(err.to_string()).extend()
        }
        RegistryError::IdSpaceExhausted => internal_error(err),
    }
}
