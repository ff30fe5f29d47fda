use services::TemplateService;
use skilltrack_core::model::{CourseTemplate, TemplateId};

use crate::state::{ViewError, ViewState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateOptionVm {
    pub id: TemplateId,
    pub label: String,
}

impl From<&CourseTemplate> for TemplateOptionVm {
    fn from(template: &CourseTemplate) -> Self {
        let label = match template.year {
            Some(year) => format!(
                "{} (Year {year}, {} skills)",
                template.name, template.skill_count
            ),
            None => format!("{} ({} skills)", template.name, template.skill_count),
        };
        Self {
            id: template.id.clone(),
            label,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplatePickerVm {
    templates: Vec<CourseTemplate>,
    selected: Option<TemplateId>,
}

impl TemplatePickerVm {
    #[must_use]
    pub fn new(templates: Vec<CourseTemplate>) -> Self {
        Self {
            templates,
            selected: None,
        }
    }

    #[must_use]
    pub fn options(&self) -> Vec<TemplateOptionVm> {
        self.templates.iter().map(TemplateOptionVm::from).collect()
    }

    /// Select a listed template. Unknown ids clear the selection.
    pub fn select(&mut self, id: &TemplateId) {
        self.selected = self.templates.iter().any(|t| &t.id == id).then(|| id.clone());
    }

    #[must_use]
    pub fn selected(&self) -> Option<&TemplateId> {
        self.selected.as_ref()
    }

    /// Create a course from the selection and return the confirmation.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Validation` when nothing is selected, otherwise
    /// the mapped service failure.
    pub async fn create(&mut self, templates: &TemplateService) -> Result<String, ViewError> {
        templates.create_course(self.selected.as_ref()).await?;
        let name = self
            .selected
            .take()
            .and_then(|id| self.templates.iter().find(|t| t.id == id))
            .map_or_else(String::new, |t| t.name.clone());
        Ok(format!("Created course from {name}").trim().to_owned())
    }
}

pub async fn load_templates(templates: &TemplateService) -> ViewState<TemplatePickerVm> {
    ViewState::from_result(templates.list().await, Vec::is_empty).map(TemplatePickerVm::new)
}
