//! # Lab Service
//!
//! The operations behind the lab endpoints. Each one loads the singleton
//! lab, changes one embedded list or field, and writes the whole document
//! back. There are no partial updates and no transactions.

use log::info;

use crate::error::{LabError, Result};
use crate::model::{Alert, Assistant, Contacts, Equipment, Lab, Project};
use crate::store::LabStore;

/// Whether the deployment's single lab exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initialized,
}

pub struct LabService<S: LabStore> {
    store: S,
}

impl<S: LabStore> LabService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn state(&self) -> Result<InitState> {
        Ok(match self.store.load()? {
            Some(_) => InitState::Initialized,
            None => InitState::Uninitialized,
        })
    }

    /// Seed the lab. Rejected if one already exists.
    pub fn initialize(&mut self, lab: Lab) -> Result<Lab> {
        if self.store.load()?.is_some() {
            return Err(LabError::AlreadyInitialized);
        }
        self.store.save(&lab)?;
        info!("lab '{}' initialized", lab.name);
        Ok(lab)
    }

    /// Create a lab with no projects, staff, or equipment.
    pub fn initialize_empty(&mut self, name: &str, location: &str) -> Result<Lab> {
        self.initialize(Lab::new(name, location))
    }

    pub fn lab(&self) -> Result<Lab> {
        self.store.load()?.ok_or(LabError::NotInitialized)
    }

    fn update<T>(&mut self, what: &str, f: impl FnOnce(&mut Lab) -> T) -> Result<T> {
        let mut lab = self.lab()?;
        let out = f(&mut lab);
        self.store.save(&lab)?;
        info!("lab '{}': {}", lab.name, what);
        Ok(out)
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.lab()?.projects)
    }

    pub fn add_project(&mut self, project: Project) -> Result<Vec<Project>> {
        self.update("project added", |lab| {
            lab.projects.push(project);
            lab.projects.clone()
        })
    }

    pub fn equipments(&self) -> Result<Vec<Equipment>> {
        Ok(self.lab()?.equipments)
    }

    pub fn add_equipment(&mut self, equipment: Equipment) -> Result<Vec<Equipment>> {
        self.update("equipment added", |lab| {
            lab.equipments.push(equipment);
            lab.equipments.clone()
        })
    }

    pub fn assistants(&self) -> Result<Vec<Assistant>> {
        Ok(self.lab()?.assistants)
    }

    pub fn add_assistant(&mut self, assistant: Assistant) -> Result<Vec<Assistant>> {
        self.update("assistant added", |lab| {
            lab.assistants.push(assistant);
            lab.assistants.clone()
        })
    }

    pub fn alerts(&self) -> Result<Vec<Alert>> {
        Ok(self.lab()?.alerts)
    }

    pub fn add_alert(&mut self, alert: Alert) -> Result<Vec<Alert>> {
        self.update("alert added", |lab| {
            lab.alerts.push(alert);
            lab.alerts.clone()
        })
    }

    /// Replace every alert at once.
    pub fn replace_alerts(&mut self, alerts: Vec<Alert>) -> Result<Vec<Alert>> {
        self.update("alerts replaced", |lab| {
            lab.alerts = alerts;
            lab.alerts.clone()
        })
    }

    pub fn contacts(&self) -> Result<Contacts> {
        Ok(self.lab()?.contacts)
    }

    /// Overwrite the contacts record.
    pub fn replace_contacts(&mut self, contacts: Contacts) -> Result<Contacts> {
        self.update("contacts updated", |lab| {
            lab.contacts = contacts;
            lab.contacts.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertCategory, Contact};
    use crate::store::MemoryStore;

    fn service() -> LabService<MemoryStore> {
        LabService::new(MemoryStore::new())
    }

    fn fire(title: &str) -> Alert {
        Alert {
            title: Some(title.to_string()),
            category: AlertCategory::Fire,
            description: None,
        }
    }

    #[test]
    fn initialize_is_rejected_when_lab_exists() {
        let mut svc = service();
        assert_eq!(svc.state().unwrap(), InitState::Uninitialized);
        svc.initialize_empty("RVCE Bio Lab", "Bengaluru").unwrap();
        assert_eq!(svc.state().unwrap(), InitState::Initialized);

        let err = svc.initialize(Lab::new("Other", "Elsewhere")).unwrap_err();
        assert!(matches!(err, LabError::AlreadyInitialized));
        assert_eq!(svc.lab().unwrap().name, "RVCE Bio Lab");
    }

    #[test]
    fn operations_before_init_fail() {
        let mut svc = service();
        assert!(matches!(svc.lab(), Err(LabError::NotInitialized)));
        assert!(matches!(svc.add_alert(fire("x")), Err(LabError::NotInitialized)));
        assert!(matches!(svc.contacts(), Err(LabError::NotInitialized)));
    }

    #[test]
    fn add_alert_appends_and_replace_overwrites() {
        let mut svc = service();
        svc.initialize_empty("Lab", "Here").unwrap();
        svc.add_alert(fire("one")).unwrap();
        let alerts = svc.add_alert(fire("two")).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[1].title.as_deref(), Some("two"));

        let replaced = svc.replace_alerts(vec![fire("only")]).unwrap();
        assert_eq!(replaced.len(), 1);
        assert_eq!(svc.alerts().unwrap(), replaced);
    }

    #[test]
    fn replace_contacts_overwrites_record() {
        let mut svc = service();
        svc.initialize_empty("Lab", "Here").unwrap();
        let contacts = Contacts {
            medical: Some(Contact {
                name: "Campus Clinic".to_string(),
                email: "clinic@example.org".to_string(),
                phone: "100".to_string(),
            }),
            ..Default::default()
        };
        svc.replace_contacts(contacts.clone()).unwrap();
        assert_eq!(svc.contacts().unwrap(), contacts);
    }
}
