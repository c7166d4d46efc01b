pub mod aliases;
pub mod engine;
pub mod error;
pub mod registry;
pub mod source;
pub mod style;
pub mod theme;
pub mod token;

// Re-export key types for easier usage
pub use engine::{CodeTokenizer, DEFAULT_MAX_LINE_LENGTH, Highlighter};
pub use error::HighlightError;
pub use registry::{LoadOutcome, TokenizerRegistry};
pub use source::{
    BUILTIN_LANGUAGES, BuiltinGrammars, DirectoryGrammars, GrammarFetch, GrammarSource, GrammarSpec,
};
pub use style::{Color, DualStyle, FontStyle, TokenStyle};
pub use theme::{DEFAULT_DARK_BACKGROUND, Theme, ThemePair, ThemeSpec, ThemeVariant, ThemeVars};
pub use token::{PLAINTEXT, Token, TokenizedCode};
