use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.math_dollars = true;
    options.render.unsafe_ = true;
    options
});

pub const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

/// The backend emits LaTeX display math as `\[ … \]`, which the renderer
/// only understands as `$$ … $$`.
pub fn fix_markdown_math(md: &str) -> String {
    md.replace("\\[", "$$").replace("\\]", "$$")
}

pub fn markdown_to_html(md: &str) -> String {
    let adapter = SyntectAdapter::new(Some("base16-ocean.dark"));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&adapter);
    markdown_to_html_with_plugins(&fix_markdown_math(md), &MARKDOWN_OPTIONS, &plugins)
}

pub fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_delimiters_are_normalized() {
        assert_eq!(fix_markdown_math("\\[x^2\\]"), "$$x^2$$");
        assert_eq!(fix_markdown_math("no math"), "no math");
    }

    #[test]
    fn renders_links_and_tables() {
        let html = markdown_to_html("see https://ftu.edu.vn");
        assert!(html.contains("<a"));
    }
}
