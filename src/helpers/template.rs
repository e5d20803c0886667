//! Script template interpolation
//!
//! Script bodies reference install variables with `{name}` placeholders.
//! `{{` and `}}` produce literal braces, so shell and PowerShell blocks can
//! still be written:
//!
//! ```text
//! hdiutil attach "{package_file}"
//! if ($x) {{ Write-Host "ok" }}
//! ```
//!
//! A placeholder with no matching variable is an error rather than being
//! left in the output.

use std::collections::BTreeMap;
use thiserror::Error;

/// Variables available to a script template, by placeholder name.
pub type Variables = BTreeMap<String, String>;

/// Errors raised while interpolating a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unresolved placeholder '{{{0}}}'")]
    Unresolved(String),

    #[error("unterminated '{{' at byte {0}")]
    Unterminated(usize),

    #[error("single '}}' at byte {0} (use '}}}}' for a literal brace)")]
    StrayClose(usize),

    #[error("empty placeholder '{{}}' at byte {0}")]
    Empty(usize),
}

/// Interpolate `template` against `vars`.
pub fn render(template: &str, vars: &Variables) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, n)| n == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }

                if !closed {
                    return Err(TemplateError::Unterminated(pos));
                }
                if name.is_empty() {
                    return Err(TemplateError::Empty(pos));
                }

                // Names are matched verbatim; `{ x }` is not `{x}`.
                let value = vars
                    .get(&name)
                    .ok_or(TemplateError::Unresolved(name))?;
                out.push_str(value);
            }
            '}' => {
                if chars.next_if(|&(_, n)| n == '}').is_none() {
                    return Err(TemplateError::StrayClose(pos));
                }
                out.push('}');
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
