/// Single-line text entry.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub placeholder: String,
}

impl TextInput {
    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            placeholder: placeholder.into(),
        }
    }

    pub fn push(&mut self, ch: char) {
        self.value.push(ch);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    /// Returns the typed text and clears the field.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

/// Vertical list with one highlighted row.
#[derive(Debug, Clone, Default)]
pub struct SelectList {
    pub items: Vec<String>,
    pub selected: usize,
}

impl SelectList {
    pub fn new(items: Vec<String>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }

        let max = self.items.len().saturating_sub(1) as isize;
        let next = (self.selected as isize + delta).clamp(0, max);
        self.selected = next as usize;
    }

    pub fn selected_index(&self) -> Option<usize> {
        (self.selected < self.items.len()).then_some(self.selected)
    }
}
