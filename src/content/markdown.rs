//! MDX rendering with syntax highlighting
//!
//! MDX bodies are rendered as GitHub-flavored Markdown. Top-level ESM
//! statements (`import` / `export`) have no HTML output and are dropped;
//! JSX elements pass through as raw HTML.

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::frontmatter::strip_frontmatter;
use crate::config::HighlightConfig;
use crate::error::SiteError;
use crate::helpers::html_escape;

lazy_static! {
    static ref ESM_START: Regex = Regex::new(r"^(import|export)\s").unwrap();
    static ref FENCE: Regex = Regex::new(r"^\s{0,3}(```|~~~)").unwrap();
}

/// MDX renderer with syntax highlighting
pub struct MdxRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MdxRenderer {
    /// Create a new renderer with highlighting enabled
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom highlight settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    /// Render a full MDX document (front-matter included) to HTML
    pub fn render_document(&self, source: &str) -> Result<String, SiteError> {
        self.render(strip_frontmatter(source))
    }

    /// Render an MDX body to HTML
    pub fn render(&self, mdx: &str) -> Result<String, SiteError> {
        let markdown = strip_esm(mdx);

        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(&markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a fenced or indented code block
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                _ => {
                    if code_block.is_none() {
                        events.push(event);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let theme = self.theme_set.themes.get(&self.theme_name).or_else(|| {
            tracing::debug!("Unknown highlight theme {}, using default", self.theme_name);
            self.theme_set.themes.values().next()
        });

        let highlighted = match theme {
            Some(theme) if self.highlight => {
                let syntax = self
                    .syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
                    .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            }
            _ => None,
        };

        match highlighted {
            Some(highlighted) if self.line_numbers => {
                self.add_line_numbers(&highlighted, code, lang)
            }
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    ///
    /// The gutter follows the source lines; syntect's own `<pre>` element
    /// becomes the code cell.
    fn add_line_numbers(&self, highlighted: &str, code: &str, lang: &str) -> String {
        let line_count = code.lines().count().max(1);

        let gutter = (1..=line_count)
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            highlighted.trim_end()
        )
    }
}

impl Default for MdxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop top-level ESM statements, leaving code fences untouched
///
/// A statement that opens a brace on its first line continues until the
/// line that closes it.
pub fn strip_esm(mdx: &str) -> String {
    let mut out = String::with_capacity(mdx.len());
    let mut fence: Option<&str> = None;
    let mut in_statement = false;

    for line in mdx.lines() {
        if in_statement {
            if line.contains('}') {
                in_statement = false;
            }
            continue;
        }

        if let Some(caps) = FENCE.captures(line) {
            let marker = caps.get(1).map(|m| m.as_str()).unwrap_or("```");
            match fence {
                Some(open) if open == marker => fence = None,
                None => fence = Some(marker),
                _ => {}
            }
        } else if fence.is_none() && ESM_START.is_match(line) {
            in_statement = line.matches('{').count() > line.matches('}').count();
            continue;
        }

        out.push_str(line);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MdxRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MdxRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight rust"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_render_without_highlighting() {
        let config = HighlightConfig {
            enable: false,
            ..HighlightConfig::default()
        };
        let renderer = MdxRenderer::with_options(&config);
        let html = renderer.render("```html\n<b>x</b>\n```").unwrap();
        assert!(html.contains(r#"<code class="language-html">&lt;b&gt;x&lt;/b&gt;"#));
    }

    #[test]
    fn test_line_numbers_match_source_lines() {
        let config = HighlightConfig {
            line_number: true,
            ..HighlightConfig::default()
        };
        let renderer = MdxRenderer::with_options(&config);
        let html = renderer
            .render("```rust\nfn a() {}\nfn b() {}\n```")
            .unwrap();

        assert_eq!(html.matches(r#"class="line-number""#).count(), 2);
        assert!(html.contains(r#"<span class="line-number">2</span></pre></td>"#));
        assert!(html.contains(r#"<td class="code"><pre style="#));
        assert!(html.contains("</pre></td></tr></table></figure>"));
    }

    #[test]
    fn test_render_gfm_table() {
        let renderer = MdxRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |").unwrap();
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_render_document_skips_frontmatter() {
        let renderer = MdxRenderer::new();
        let html = renderer
            .render_document("---\ntitle: Hidden\n---\n\nVisible body")
            .unwrap();
        assert!(!html.contains("Hidden"));
        assert!(html.contains("Visible body"));
    }

    #[test]
    fn test_strip_esm() {
        let mdx = r#"import { Callout } from '../components'
export const meta = { wide: true }
import {
  Tabs,
  Tab,
} from 'nextra/components'

Body paragraph.

```js
import fs from 'fs'
```
"#;
        let stripped = strip_esm(mdx);
        assert!(!stripped.contains("Callout }"));
        assert!(!stripped.contains("export const"));
        assert!(!stripped.contains("Tabs"));
        assert!(stripped.contains("Body paragraph."));
        // Imports inside code fences are content
        assert!(stripped.contains("import fs from 'fs'"));
    }
}
