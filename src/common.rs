use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use handlebars::Handlebars;

use crate::config::DiagramConfig;
use crate::site::SiteContext;
use crate::tag::DiagramBlock;

pub fn write_string_to_file(filename: &str, content: &str) -> std::io::Result<()> {
    let path = Path::new(filename);
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Template registry for page rendering, with the `diagram` block helper
/// bound to the given site context.
pub fn get_handlebars(site: Arc<SiteContext>, config: &DiagramConfig) -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_helper("diagram", Box::new(DiagramBlock::new(site, config)));
    handlebars
}
