//! HTML pages rendered with tera.
//!
//! Templates are compiled into the binary; file names end in `.html` so tera
//! autoescapes every interpolated value.

use tera::{Context, Tera};

use crate::error::Result;

const LOGIN: &str = "login.html";
const UPLOAD: &str = "upload.html";
const LIST: &str = "list.html";

/// Parsed page templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Parse the embedded templates.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (LOGIN, include_str!("../templates/login.html")),
            (UPLOAD, include_str!("../templates/upload.html")),
            (LIST, include_str!("../templates/list.html")),
        ])?;
        Ok(Self { tera })
    }

    /// Login form, optionally with an error line above it.
    pub fn login(&self, error: Option<&str>) -> Result<String> {
        let mut context = Context::new();
        context.insert("error", &error);
        Ok(self.tera.render(LOGIN, &context)?)
    }

    /// Upload form.
    pub fn upload(&self) -> Result<String> {
        Ok(self.tera.render(UPLOAD, &Context::new())?)
    }

    /// Album listing.
    pub fn list(&self, images: &[String]) -> Result<String> {
        let mut context = Context::new();
        context.insert("images", images);
        Ok(self.tera.render(LIST, &context)?)
    }
}
