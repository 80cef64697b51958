//! minijinja-backed template loader

use std::path::Path;
use std::sync::LazyLock;

use minijinja::{Environment, ErrorKind, Template};
use regex::Regex;

use super::{BlockTemplate, TemplateError, TemplateLoader, TemplateVariables};

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%[-+]?\s*block\s+([A-Za-z_][A-Za-z0-9_]*)").expect("block tag pattern is valid")
});

static EXTENDS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%[-+]?\s*extends\s+["']([^"']+)["']"#).expect("extends tag pattern is valid")
});

/// Comments and raw sections never declare blocks
static INACTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{#.*?#\}|\{%[-+]?\s*raw\s*[-+]?%\}.*?\{%[-+]?\s*endraw\s*[-+]?%\}")
        .expect("inactive section pattern is valid")
});

/// Template environment for email templates
///
/// Templates are read from a directory, or registered from strings. Names
/// ending in `.html` are auto-escaped, which keeps rendered bodies HTML-safe.
///
/// # Examples
///
/// ```rust
/// use info_collection::template::{MiniJinjaTemplates, TemplateLoader};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let templates = MiniJinjaTemplates::from_sources([(
///     "email/contact.html",
///     "{% block subject %}Hello{% endblock %}{% block email %}<p>Hi</p>{% endblock %}",
/// )])?;
///
/// let template = templates.load("email/contact.html")?;
/// assert!(template.has_block("subject"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MiniJinjaTemplates {
    env: Environment<'static>,
}

impl MiniJinjaTemplates {
    /// Load templates lazily from a directory
    #[must_use]
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Self::environment();
        env.set_loader(minijinja::path_loader(dir.as_ref()));
        Self { env }
    }

    /// Register templates from `(name, source)` pairs
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Render` if a source fails to parse
    pub fn from_sources<I, N, S>(sources: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = Self::environment();
        for (name, source) in sources {
            env.add_template_owned(name.into(), source.into())?;
        }
        Ok(Self { env })
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env
    }
}

impl MiniJinjaTemplates {
    /// Blocks a template can render, its own first and then those inherited
    /// through `{% extends %}`
    ///
    /// Only literal parent names are followed. A parent that fails to load
    /// ends the chain; rendering reports it.
    fn exposed_blocks(&self, name: &str, source: &str) -> Vec<String> {
        let mut blocks = Vec::new();
        let mut chain = vec![name.to_string()];
        let mut source = source.to_string();

        loop {
            let active = INACTIVE.replace_all(&source, "").into_owned();
            for block in declared_blocks(&active) {
                if !blocks.contains(&block) {
                    blocks.push(block);
                }
            }

            let Some(parent) = EXTENDS_TAG.captures(&active).map(|c| c[1].to_string()) else {
                break;
            };
            if chain.contains(&parent) {
                break;
            }
            match self.env.get_template(&parent) {
                Ok(template) => source = template.source().to_string(),
                Err(e) => {
                    tracing::debug!(template = name, parent, error = %e, "Parent template not loadable");
                    break;
                }
            }
            chain.push(parent);
        }

        blocks
    }
}

impl TemplateLoader for MiniJinjaTemplates {
    fn load(&self, name: &str) -> Result<Box<dyn BlockTemplate + '_>, TemplateError> {
        let template = self.env.get_template(name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                TemplateError::NotFound(name.to_string())
            } else {
                TemplateError::Render(e)
            }
        })?;

        let blocks = self.exposed_blocks(name, template.source());
        tracing::trace!(template = name, ?blocks, "Loaded email template");

        Ok(Box::new(LoadedTemplate { template, blocks }))
    }
}

struct LoadedTemplate<'env> {
    template: Template<'env, 'env>,
    blocks: Vec<String>,
}

impl BlockTemplate for LoadedTemplate<'_> {
    fn name(&self) -> &str {
        self.template.name()
    }

    fn has_block(&self, block: &str) -> bool {
        self.blocks.iter().any(|b| b == block)
    }

    fn block_names(&self) -> Vec<String> {
        self.blocks.clone()
    }

    fn render_block(
        &self,
        block: &str,
        variables: &TemplateVariables<'_>,
    ) -> Result<String, TemplateError> {
        let mut state = self.template.eval_to_state(variables)?;
        Ok(state.render_block(block)?)
    }
}

/// Block tags in a template source, first occurrence only
fn declared_blocks(source: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    for captures in BLOCK_TAG.captures_iter(source) {
        let name = &captures[1];
        if !blocks.iter().any(|b| b == name) {
            blocks.push(name.to_string());
        }
    }
    blocks
}
