use std::fmt::{self, Display};

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use crate::widget::view::WidgetView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Widget,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Widget => "widget",
        }
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

pub fn new() -> Handlebars<'static> {
    let mut tt = Handlebars::new();
    tt.register_template_string(Template::Index.as_str(), include_str!("template/index.hbs"))
        .unwrap();
    tt.register_partial(Template::Widget.as_str(), include_str!("template/widget.hbs"))
        .unwrap();

    tt
}

/// Renders the host page around the widget's current view.
pub fn render_page(tt: &Handlebars<'_>, widget: &WidgetView) -> Result<String> {
    #[derive(Serialize)]
    struct Page<'a> {
        widget: &'a WidgetView,
    }

    tt.render(Template::Index.as_str(), &Page { widget })
        .context("could not render the HTML template")
}
