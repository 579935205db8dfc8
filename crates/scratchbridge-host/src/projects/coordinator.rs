use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use scratchbridge_core::error::Result;
use scratchbridge_core::ProjectPayload;

use super::store::ProjectStore;
use super::types::{NewProject, Project, ProjectJson, ProjectUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// First save created the project with this id.
    Created(String),
    Updated(String),
    /// Another save was still in flight.
    Skipped,
}

#[derive(Debug, Default)]
struct Target {
    project_id: Option<String>,
    title: String,
}

/// Turns saved payloads into create/update calls for one editor session.
pub struct SaveCoordinator {
    store: Arc<dyn ProjectStore>,
    target: Mutex<Target>,
    saving: AtomicBool,
    initial_loaded: AtomicBool,
}

/// Clears the in-flight flag however the save ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SaveCoordinator {
    pub fn new(store: Arc<dyn ProjectStore>, title: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            store,
            target: Mutex::new(Target {
                project_id,
                title: title.into(),
            }),
            saving: AtomicBool::new(false),
            initial_loaded: AtomicBool::new(false),
        }
    }

    fn target(&self) -> MutexGuard<'_, Target> {
        self.target.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn project_id(&self) -> Option<String> {
        self.target().project_id.clone()
    }

    pub fn title(&self) -> String {
        self.target().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.target().title = title.into();
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Persist one saved payload. The first save creates the project.
    pub async fn persist(&self, payload: ProjectPayload) -> Result<SaveOutcome> {
        if self.saving.swap(true, Ordering::AcqRel) {
            tracing::debug!("save already in flight, skipping");
            return Ok(SaveOutcome::Skipped);
        }
        let _in_flight = InFlight(&self.saving);

        let (project_id, title) = {
            let target = self.target();
            (target.project_id.clone(), target.title.clone())
        };
        let project_json = ProjectJson::new(payload);

        match project_id {
            Some(id) => {
                let update = ProjectUpdate {
                    title: Some(title),
                    project_json: Some(project_json),
                    ..ProjectUpdate::default()
                };
                self.store.update(&id, &update).await?;
                tracing::info!(project = %id, "project updated");
                Ok(SaveOutcome::Updated(id))
            }
            None => {
                let new_project = NewProject {
                    title,
                    description: None,
                    project_json,
                };
                let created = self.store.create(&new_project).await?;
                tracing::info!(project = %created.id, "project created");
                self.target().project_id = Some(created.id.clone());
                Ok(SaveOutcome::Created(created.id))
            }
        }
    }

    /// Payload to load into the editor, yielded for the first fetched project
    /// only. Later re-fetches keep the editor's newer state.
    pub fn initial_payload(&self, project: &Project) -> Option<ProjectPayload> {
        {
            let mut target = self.target();
            target.project_id = Some(project.id.clone());
            target.title = project.title.clone();
        }
        let payload = project.project_json.sb3.clone()?;
        if self.initial_loaded.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(payload)
    }

    /// Fetch the configured project and return its initial payload.
    pub async fn open(&self) -> Result<Option<ProjectPayload>> {
        let Some(id) = self.project_id() else {
            return Ok(None);
        };
        let project = self.store.get(&id).await?;
        Ok(self.initial_payload(&project))
    }
}
