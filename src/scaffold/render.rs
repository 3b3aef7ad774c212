use std::collections::HashMap;

/// Switches the parser to `<%% %%>` before the template body. The marker char
/// after it keeps the switch off a standalone line, otherwise mustache would
/// swallow a leading newline of the template.
const DELIMITER_SWITCH: &str = "{{=<%% %%>=}}";
const MARKER: char = '\u{1}';

/// Variables visible to a template.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

/// Renders `template` as mustache with `<%%`/`%%>` delimiters.
///
/// `<%% var %%>` is HTML-escaped, `<%%& var %%>` and `<%%{ var }%%>` are not;
/// sections, inverted sections and comments follow mustache rules.
pub fn render(template: &str, context: &Context) -> Result<String, mustache::Error> {
    let source = format!("{DELIMITER_SWITCH}{MARKER}{template}");
    let compiled = mustache::compile_str(&source)?;
    let rendered = compiled.render_to_string(&context.vars)?;

    let body_start = if rendered.starts_with(MARKER) {
        MARKER.len_utf8()
    } else {
        0
    };
    Ok(rendered[body_start..].to_string())
}
