//! Detail view builder for key-value display of a single record.

use console::style;

/// A builder for detail views (key-value display).
pub struct DetailView {
    title: String,
    sections: Vec<DetailSection>,
}

enum Line {
    Field(String, String),
    Item(String),
    Block(String),
}

struct DetailSection {
    header: Option<String>,
    lines: Vec<Line>,
}

impl DetailView {
    /// Create a new detail view with the given title.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sections: vec![DetailSection {
                header: None,
                lines: vec![],
            }],
        }
    }

    /// Add a key-value field to the current section.
    pub fn field(self, key: &str, value: &str) -> Self {
        self.push(Line::Field(key.to_string(), value.to_string()))
    }

    /// Add a field only if the value is Some.
    pub fn field_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Start a new named section with a header.
    pub fn section(mut self, header: &str) -> Self {
        self.sections.push(DetailSection {
            header: Some(header.to_string()),
            lines: vec![],
        });
        self
    }

    /// Add a bullet-point item to the current section.
    pub fn item(self, text: &str) -> Self {
        self.push(Line::Item(text.to_string()))
    }

    /// Add verbatim multi-line text, indented, to the current section.
    pub fn block(self, text: &str) -> Self {
        self.push(Line::Block(text.to_string()))
    }

    fn push(mut self, line: Line) -> Self {
        if let Some(section) = self.sections.last_mut() {
            section.lines.push(line);
        }
        self
    }

    /// Render the detail view to a string.
    pub fn render(&self) -> String {
        let mut out = vec![style(&self.title).bold().to_string()];
        let key_width = self
            .sections
            .iter()
            .flat_map(|s| s.lines.iter())
            .filter_map(|line| match line {
                Line::Field(key, _) => Some(key.len()),
                _ => None,
            })
            .max()
            .unwrap_or(12);

        for section in &self.sections {
            if let Some(header) = &section.header {
                out.push(String::new());
                out.push(style(header).bold().underlined().to_string());
            }
            for line in &section.lines {
                match line {
                    Line::Field(key, value) => {
                        let padded = format!("{:<width$}", format!("{key}:"), width = key_width + 1);
                        out.push(format!("  {}  {value}", style(padded).dim()));
                    }
                    Line::Item(text) => out.push(format!("  {} {text}", style("\u{2022}").dim())),
                    Line::Block(text) => out.extend(text.lines().map(|l| format!("    {l}"))),
                }
            }
        }
        out.join("\n")
    }
}
