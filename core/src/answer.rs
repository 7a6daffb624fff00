use crate::catalog::AnswerSpec;
use crate::error::ActionError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerField {
    pub id: String,
    pub label: String,
    expected: String,
    pub value: String,
}

impl AnswerField {
    pub fn is_correct(&self) -> bool {
        self.value.trim() == self.expected
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerGate {
    fields: Vec<AnswerField>,
}

impl AnswerGate {
    pub fn new(specs: &[AnswerSpec]) -> Self {
        let fields = specs
            .iter()
            .map(|answer| AnswerField {
                id: answer.id.to_string(),
                label: answer.label.to_string(),
                expected: answer.expected.to_string(),
                value: String::new(),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[AnswerField] {
        &self.fields
    }

    pub fn value(&self, field_id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.id == field_id)
            .map(|field| field.value.as_str())
    }

    pub fn set_answer(&mut self, field_id: &str, text: &str) -> Result<(), ActionError> {
        let Some(field) = self.fields.iter_mut().find(|field| field.id == field_id) else {
            return Err(ActionError::UnknownField(field_id.to_string()));
        };
        field.value = text.to_string();
        Ok(())
    }

    pub fn check(&self) -> bool {
        self.fields.iter().all(AnswerField::is_correct)
    }

    pub(crate) fn fill_expected(&mut self) {
        for field in &mut self.fields {
            field.value.clone_from(&field.expected);
        }
    }

    pub(crate) fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
    }
}
