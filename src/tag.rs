use std::sync::Arc;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
    Renderable, StringOutput,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{DiagramConfig, FailureMode};
use crate::site::{SiteContext, StaticFile};
use crate::tool::{DiagramTool, RenderOutcome};

/// Block helper `{{#diagram NAME}}...{{/diagram}}`.
///
/// The block body is rendered through the normal template pipeline (nested
/// variables and helpers resolve), piped to the external tool which writes
/// `NAME.png` into the site source root, the file is registered with the
/// static-file registry, and the block expands to an `<img>` tag pointing at
/// `/NAME.png`.
pub struct DiagramBlock {
    site: Arc<SiteContext>,
    tool: DiagramTool,
    on_failure: FailureMode,
    name_pattern: Regex,
}

impl DiagramBlock {
    pub fn new(site: Arc<SiteContext>, config: &DiagramConfig) -> Self {
        Self {
            site,
            tool: DiagramTool::new(&config.command),
            on_failure: config.on_failure,
            // compiled once per helper, the pattern is a literal
            name_pattern: Regex::new(r"^[a-zA-Z0-9_\-]+$").expect("name pattern to compile"),
        }
    }
}

/// The output name becomes a path fragment and a URL, so it is restricted to
/// identifier characters.
fn validate_name(pattern: &Regex, raw: &str) -> Result<String, RenderError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RenderError::new("diagram output name cannot be empty"));
    }
    if !pattern.is_match(trimmed) {
        return Err(RenderError::new(format!(
            "diagram output name can only contain letters, numbers, underscores and hyphens: {:?}",
            raw
        )));
    }
    Ok(trimmed.to_string())
}

impl HelperDef for DiagramBlock {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let param = h
            .param(0)
            .ok_or_else(|| RenderError::new("diagram helper requires an output name"))?;

        // Accepts a bare token ({{#diagram wire1}}) or a string literal.
        let raw_name = if let Some(s) = param.value().as_str() {
            s.to_string()
        } else if param.value().is_null() {
            param
                .relative_path()
                .cloned()
                .ok_or_else(|| RenderError::new("diagram output name must be a string"))?
        } else {
            return Err(RenderError::new("diagram output name must be a string"));
        };
        let name = validate_name(&self.name_pattern, &raw_name)?;

        let contents = match h.template() {
            Some(t) => {
                let mut buf = StringOutput::new();
                t.render(r, ctx, rc, &mut buf)?;
                buf.into_string().map_err(RenderError::from)?
            }
            None => String::new(),
        };

        let file_name = format!("{}.png", name);
        let outcome = self
            .tool
            .render(&contents, &self.site.source, &file_name)
            .map_err(|e| RenderError::from_error("diagram tool invocation failed", e))?;

        match outcome {
            RenderOutcome::Success { path } => {
                debug!("Rendered diagram: {}", path.display());
            }
            RenderOutcome::Failed { exit_code, stderr } => match self.on_failure {
                FailureMode::Error => {
                    return Err(RenderError::new(format!(
                        "diagram tool failed for {} (exit code {:?}): {}",
                        file_name, exit_code, stderr
                    )));
                }
                FailureMode::Warn => {
                    warn!(
                        "Diagram tool failed for {} (exit code {:?}): {}",
                        file_name, exit_code, stderr
                    );
                }
            },
        }

        self.site
            .register_static_file(StaticFile::new(&self.site.source, "", &file_name));

        out.write(&format!("<img src='/{}.png' width='75%'>", name))?;
        Ok(())
    }
}
