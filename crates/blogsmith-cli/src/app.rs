//! Wiring from configuration to the highlighter, editor and settings service

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use blogsmith_config::Config;
use blogsmith_editor::{Document, Editor};
use blogsmith_highlight::{
    BuiltinGrammars, DirectoryGrammars, GrammarSource, ThemePair, TokenizerRegistry,
};
use blogsmith_settings::{JsonFileStore, SettingsService};

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("config file {} not found", path.display()))?,
        None => Config::load_or_default()?,
    };
    Ok(config)
}

pub fn registry(config: &Config) -> Rc<TokenizerRegistry> {
    let highlight = &config.highlight;
    let source: Rc<dyn GrammarSource> = match &highlight.grammar_dir {
        Some(dir) => {
            log::info!("Loading grammars from {}", dir.display());
            Rc::new(DirectoryGrammars::new(dir))
        }
        None => Rc::new(BuiltinGrammars),
    };
    let themes = ThemePair::vitesse().with_dark_background(&highlight.dark_background);

    Rc::new(TokenizerRegistry::new(source, themes).with_max_line_length(highlight.max_line_length))
}

/// Open a post and let every background load finish
pub fn open_post(config: &Config, path: &Path) -> Result<Editor> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc = Document::from_bytes(&bytes)?;

    let mut editor = Editor::new(doc, registry(config))
        .with_copy_feedback(Duration::from_millis(config.editor.copy_feedback_ms));
    editor.run_pending();
    log::debug!(
        "Opened {} with {} code blocks",
        path.display(),
        editor.views().len()
    );
    Ok(editor)
}

pub fn settings_service(config: &Config) -> SettingsService {
    let store = JsonFileStore::new(&config.settings.store_path);
    SettingsService::new(Arc::new(store), config.settings.cache_capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_open_post_highlights_after_loads() {
        let dir = TempDir::new().unwrap();
        let post = dir.path().join("post.md");
        std::fs::write(&post, "# Post\n\n```py\n# note\nx = 1\n```\n").unwrap();

        let editor = open_post(&Config::default(), &post).unwrap();
        assert!(editor.sync().is_ready());
        assert_eq!(editor.views().len(), 1);
        assert!(editor.registry().ready_engine().unwrap().is_loaded("python"));
        assert!(!editor.decorations().is_empty());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
