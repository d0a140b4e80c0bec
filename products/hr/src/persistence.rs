//! Reads and writes the whole employee collection as one JSON blob.

use std::collections::HashSet;

use platform_store::{KeyValueStore, StoreError};
use thiserror::Error;

use crate::employee::Employee;

/// Fixed key the collection is stored under.
pub const STORAGE_KEY: &str = "employees";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("stored collection could not be read")]
    Read(#[source] StoreError),
    #[error("stored collection is not valid JSON")]
    Malformed(#[source] serde_json::Error),
    #[error("stored collection is inconsistent: {0}")]
    Inconsistent(String),
    #[error("collection could not be encoded")]
    Encode(#[source] serde_json::Error),
    #[error("collection could not be written")]
    Write(#[source] StoreError),
}

/// `Ok(None)` when nothing was saved yet.
pub fn load_employees(store: &dyn KeyValueStore) -> Result<Option<Vec<Employee>>, PersistenceError> {
    let Some(raw) = store.get(STORAGE_KEY).map_err(PersistenceError::Read)? else {
        return Ok(None);
    };
    let employees: Vec<Employee> =
        serde_json::from_str(&raw).map_err(PersistenceError::Malformed)?;
    check_identities(&employees)?;
    Ok(Some(employees))
}

pub fn save_employees(
    store: &dyn KeyValueStore,
    employees: &[Employee],
) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string(employees).map_err(PersistenceError::Encode)?;
    store.put(STORAGE_KEY, &raw).map_err(PersistenceError::Write)
}

fn check_identities(employees: &[Employee]) -> Result<(), PersistenceError> {
    let mut seen = HashSet::with_capacity(employees.len());
    for employee in employees {
        if employee.id.get() == 0 {
            return Err(PersistenceError::Inconsistent("id 0 is not allowed".into()));
        }
        if !seen.insert(employee.id) {
            return Err(PersistenceError::Inconsistent(format!(
                "duplicate id {}",
                employee.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_employees;
    use platform_store::MemoryStore;

    #[test]
    fn save_then_load_preserves_records_and_order() {
        let store = MemoryStore::new();
        let mut employees = seed_employees();
        employees.reverse();
        save_employees(&store, &employees).unwrap();
        let loaded = load_employees(&store).unwrap().unwrap();
        assert_eq!(loaded, employees);
    }

    #[test]
    fn nothing_saved_loads_as_none() {
        let store = MemoryStore::new();
        assert!(load_employees(&store).unwrap().is_none());
    }

    #[test]
    fn garbage_is_malformed() {
        let store = MemoryStore::new();
        store.put(STORAGE_KEY, "{not json").unwrap();
        assert!(matches!(
            load_employees(&store),
            Err(PersistenceError::Malformed(_))
        ));
        store.put(STORAGE_KEY, r#"[{"id":1}]"#).unwrap();
        assert!(matches!(
            load_employees(&store),
            Err(PersistenceError::Malformed(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        let mut employees = seed_employees();
        employees[1].id = employees[0].id;
        save_employees(&store, &employees).unwrap();
        assert!(matches!(
            load_employees(&store),
            Err(PersistenceError::Inconsistent(_))
        ));
    }

    #[test]
    fn blob_uses_storage_layout() {
        let store = MemoryStore::new();
        save_employees(&store, &seed_employees()[..1]).unwrap();
        let raw = store.get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = value[0].as_object().unwrap();
        let mut keys: Vec<_> = record.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "avatar", "date", "department", "email", "firstName", "id", "lastName",
                "phone", "position", "salary", "status"
            ]
        );
        assert_eq!(record["date"], "2019-04-11");
    }
}
