//! Terminal output for highlighted posts

use std::fmt::Write as _;
use std::io::{self, Write};

use blogsmith_editor::Editor;
use blogsmith_highlight::aliases::aliases_of;
use blogsmith_highlight::{Color, TokenStyle, TokenizedCode, TokenizerRegistry, ThemeVariant};
use crossterm::queue;
use crossterm::style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor};

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Print every code block of the open post in 24-bit colour
pub fn write_code_blocks(
    out: &mut impl Write,
    editor: &Editor,
    variant: ThemeVariant,
) -> io::Result<()> {
    let engine = editor.registry().ready_engine();
    let blocks = editor.document().code_blocks();
    if blocks.is_empty() {
        return writeln!(out, "no code blocks");
    }

    for block in &blocks {
        let label = editor
            .view_at(block.start())
            .map_or("text", |view| view.language_label());
        queue!(
            out,
            SetAttribute(Attribute::Dim),
            Print(format!("── {label} ──\n")),
            SetAttribute(Attribute::Reset)
        )?;

        let Some(engine) = &engine else {
            writeln!(out, "{}", block.text)?;
            continue;
        };
        let tokens = match engine.tokenize(&block.text, &block.language) {
            Ok(tokens) => tokens,
            Err(e) => {
                log::warn!("Printing block at {} plain: {e}", block.start());
                TokenizedCode::plain(&block.text)
            }
        };

        let fg = engine.theme(variant).fg;
        for line in &tokens.lines {
            for token in line {
                let style = match variant {
                    ThemeVariant::Light => token.style.light,
                    ThemeVariant::Dark => token.style.dark,
                };
                write_token(out, &token.content, style, fg)?;
            }
            queue!(out, Print("\n"))?;
        }
    }
    out.flush()
}

fn write_token(out: &mut impl Write, text: &str, style: TokenStyle, fg: Color) -> io::Result<()> {
    queue!(out, SetForegroundColor(term_color(style.color.unwrap_or(fg))))?;
    if style.font.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.font.italic {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if style.font.underline {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)
}

/// One `from..to style` line per decoration
pub fn format_decorations(editor: &Editor) -> String {
    let mut out = String::new();
    for decoration in editor.decorations() {
        let _ = writeln!(out, "{}..{} {}", decoration.from, decoration.to, decoration.style);
    }
    out
}

/// Loadable languages, each with the aliases that resolve to it
pub fn format_languages(registry: &TokenizerRegistry) -> String {
    let mut out = String::new();
    for language in registry.languages() {
        let aliases = aliases_of(&language);
        if aliases.is_empty() {
            let _ = writeln!(out, "{language}");
        } else {
            let _ = writeln!(out, "{language} ({})", aliases.join(", "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use blogsmith_config::Config;
    use blogsmith_editor::Document;
    use pretty_assertions::assert_eq;

    fn editor(text: &str) -> Editor {
        let mut editor = Editor::new(Document::from_text(text), app::registry(&Config::default()));
        editor.run_pending();
        editor
    }

    #[test]
    fn test_code_blocks_in_true_colour() {
        let editor = editor("intro\n\n```rust\nfn main() {}\n```\n");
        let mut out = Vec::new();
        write_code_blocks(&mut out, &editor, ThemeVariant::Dark).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("── Rust ──"));
        assert!(out.contains("\x1b[38;2;"));
        assert!(out.contains("main"));
        assert!(!out.contains("intro"));
    }

    #[test]
    fn test_no_code_blocks() {
        let mut out = Vec::new();
        write_code_blocks(&mut out, &editor("just prose\n"), ThemeVariant::Light).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "no code blocks\n");
    }

    #[test]
    fn test_decorations_cover_code() {
        let editor = editor("```js\nlet a = 1;\n```\n");
        let listing = format_decorations(&editor);
        let first = listing.lines().next().unwrap();
        assert!(first.starts_with("6..9 "), "{first}");
        assert!(first.contains("color:#"));
    }

    #[test]
    fn test_languages_list_aliases() {
        let listing = format_languages(&app::registry(&Config::default()));
        insta::assert_snapshot!(listing.trim_end(), @r"
        bash
        c
        cpp
        csharp
        css
        dockerfile
        go
        html
        java
        javascript (js)
        json
        jsx
        kotlin
        markdown (md)
        php
        python (py)
        ruby
        rust
        shell (sh, bash, zsh)
        sql
        swift
        tsx
        typescript (ts)
        xml
        yaml (yml)
        ");
    }
}
