/// Rendering composition
///
/// The wizard is agnostic of the view type `V`. Steps and extra child
/// components are closures producing `V`; [`Wizard::render`] feeds them the
/// props they need and assembles a [`WizardView`].
use std::sync::Arc;

use serde::Serialize;

use super::flow::Wizard;
use super::paths::StepPathnames;
use super::steps::StepId;

/// What a step sees as "current step"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StepMarker {
    Id(StepId),
    /// Shown once the wizard has finished: the total step count
    Number(usize),
}

impl std::fmt::Display for StepMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepMarker::Id(id) => write!(f, "{}", id),
            StepMarker::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Props handed to the active step component
#[derive(Clone)]
pub struct StepProps<V> {
    pub current_step: StepMarker,
    pub steps_total: usize,
    /// Handle for `on_step_change_triggered` and `on_form_change_triggered`
    pub wizard: Wizard<V>,
}

/// Props injected into every extra child component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildProps {
    pub step_ids: Vec<StepId>,
    pub current_step_index: Option<usize>,
    pub paths: StepPathnames,
}

/// Extra component rendered next to the steps box (progress bars, breadcrumbs)
pub type ChildComponent<V> = Arc<dyn Fn(&ChildProps) -> V + Send + Sync>;

pub fn child<V, F>(render: F) -> ChildComponent<V>
where
    F: Fn(&ChildProps) -> V + Send + Sync + 'static,
{
    Arc::new(render)
}

/// Assembled output of one render pass
#[derive(Debug, Clone, PartialEq)]
pub struct WizardView<V> {
    pub wrapper_class_name: String,
    pub class_name: String,
    pub has_children: bool,
    pub children: Vec<V>,
    pub steps_box_class_name: String,
    pub step: V,
}

impl<V: 'static> Wizard<V> {
    pub fn render(&self, children: &[ChildComponent<V>]) -> WizardView<V> {
        let view = self.derived_view();

        let child_props = ChildProps {
            step_ids: view.step_ids.clone(),
            current_step_index: view.current_index,
            paths: view.paths.clone(),
        };
        let rendered: Vec<V> = children.iter().map(|c| c(&child_props)).collect();

        let component = self.step_component(view.current_index.unwrap_or(view.steps_total));
        let props = StepProps {
            current_step: view.current_step.clone(),
            steps_total: view.steps_total,
            wizard: self.clone(),
        };

        let classes = self.class_names();
        WizardView {
            wrapper_class_name: classes.wrapper_class_name.clone(),
            class_name: classes.class_name.clone(),
            has_children: !rendered.is_empty(),
            children: rendered,
            steps_box_class_name: classes.steps_box_class_name.clone(),
            step: component(&props),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_display() {
        let id = StepId::new("details").unwrap();
        assert_eq!(StepMarker::Id(id).to_string(), "details");
        assert_eq!(StepMarker::Number(3).to_string(), "3");
    }

    #[test]
    fn test_marker_serializes_untagged() {
        let id = StepId::new("intro").unwrap();
        assert_eq!(serde_json::to_string(&StepMarker::Id(id)).unwrap(), "\"intro\"");
        assert_eq!(serde_json::to_string(&StepMarker::Number(3)).unwrap(), "3");
    }

    #[test]
    fn test_child_props_serialize() {
        let props = ChildProps {
            step_ids: vec![StepId::new("intro").unwrap()],
            current_step_index: Some(0),
            paths: StepPathnames {
                previous: None,
                current: Some("/f/#intro".into()),
                next: None,
            },
        };
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["step_ids"][0], "intro");
        assert_eq!(json["paths"]["current"], "/f/#intro");
    }
}
