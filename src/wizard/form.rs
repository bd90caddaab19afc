/// Form completion tracking
///
/// A step reports its live form as a [`FormSnapshot`]; the wizard turns it
/// into a completion percentage used by the discard guard and progress UI.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Input,
    Select,
    Textarea,
    Button,
    Other,
}

/// One form control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormElement {
    pub name: String,
    pub kind: ElementKind,
    #[serde(default)]
    pub disabled: bool,
}

impl FormElement {
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Input,
            disabled: false,
        }
    }

    pub fn button(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Button,
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Counts towards completion
    pub fn is_fillable(&self) -> bool {
        self.kind != ElementKind::Button && !self.disabled
    }
}

/// A form's controls plus the values currently filled in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub elements: Vec<FormElement>,
    /// Filled values keyed by control name
    pub values: Map<String, Value>,
}

impl FormSnapshot {
    pub fn new(elements: Vec<FormElement>) -> Self {
        Self {
            elements,
            values: Map::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn enabled_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_fillable()).count()
    }

    pub fn filled_count(&self) -> usize {
        self.values.len()
    }

    /// `floor(100 * filled / enabled)`, clamped to 100; 0 for a form with no
    /// fillable controls
    pub fn completion_percentage(&self) -> u8 {
        let enabled = self.enabled_count();
        if enabled == 0 {
            return 0;
        }
        let percentage = (self.filled_count() * 100) / enabled;
        percentage.min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_fields() -> FormSnapshot {
        FormSnapshot::new(vec![
            FormElement::input("first_name"),
            FormElement::input("last_name"),
            FormElement::input("email"),
            FormElement::input("phone"),
            FormElement::button("submit"),
            FormElement::input("referral").disabled(),
        ])
    }

    #[test]
    fn test_three_of_four_is_75() {
        let form = four_fields()
            .with_value("first_name", "Ada")
            .with_value("last_name", "Lovelace")
            .with_value("email", "ada@example.com");

        assert_eq!(form.enabled_count(), 4);
        assert_eq!(form.completion_percentage(), 75);
    }

    #[test]
    fn test_percentage_rounds_down() {
        let form = FormSnapshot::new(vec![
            FormElement::input("a"),
            FormElement::input("b"),
            FormElement::input("c"),
        ])
        .with_value("a", 1);

        assert_eq!(form.completion_percentage(), 33);
    }

    #[test]
    fn test_empty_form() {
        assert_eq!(FormSnapshot::default().completion_percentage(), 0);

        let only_buttons = FormSnapshot::new(vec![FormElement::button("next")]).with_value("x", 1);
        assert_eq!(only_buttons.completion_percentage(), 0);
    }

    #[test]
    fn test_percentage_is_clamped() {
        let form = FormSnapshot::new(vec![FormElement::input("a")])
            .with_value("a", 1)
            .with_value("extra", 2);
        assert_eq!(form.completion_percentage(), 100);
    }

    #[test]
    fn test_snapshot_from_json() {
        let form: FormSnapshot = serde_json::from_str(
            r#"{
                "elements": [
                    {"name": "email", "kind": "input"},
                    {"name": "plan", "kind": "select", "disabled": true},
                    {"name": "go", "kind": "button"}
                ],
                "values": {"email": "ada@example.com"}
            }"#,
        )
        .unwrap();

        assert_eq!(form.enabled_count(), 1);
        assert_eq!(form.completion_percentage(), 100);
    }
}
