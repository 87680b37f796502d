use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

const MATH_ENVIRONMENTS: &[&str] = &["equation", "align", "math", "displaymath"];

// `%` up to end of line, unless escaped as `\%`. An even run of backslashes
// before it is a line break, so the `%` still starts a comment.
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[^\\])((?:\\\\)*)%.*$").expect("valid regex"));

static MATH_ENV_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    MATH_ENVIRONMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(
                r"(?s)\\begin\{{{name}\*?\}}.*?\\end\{{{name}\*?\}}"
            ))
            .expect("valid regex")
        })
        .collect()
});

static DISPLAY_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\\[.*?\\\]").expect("valid regex"));

static INLINE_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[^$]+\$").expect("valid regex"));

static TEXT_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:textbf|textit|emph|underline)\{([^}]*)\}").expect("valid regex")
});

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:[a-zA-Z]+\*?(?:\[[^\]]*\])?(?:\{[^}]*\})?|\\)").expect("valid regex")
});

static BRACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[{}]").expect("valid regex"));

/// Reduces LaTeX source to the prose a reader would see.
pub fn strip_latex(content: &str) -> String {
    let mut text = COMMENT_RE.replace_all(content, "$1$2").into_owned();
    for env in MATH_ENV_RES.iter() {
        text = replace_owned(env, text, " ");
    }
    text = replace_owned(&DISPLAY_MATH_RE, text, " ");
    text = replace_owned(&INLINE_MATH_RE, text, " ");
    text = replace_owned(&TEXT_COMMAND_RE, text, "$1");
    text = replace_owned(&COMMAND_RE, text, " ");
    replace_owned(&BRACES_RE, text, " ")
}

fn replace_owned(re: &Regex, text: String, replacement: &str) -> String {
    match re.replace_all(&text, replacement) {
        Cow::Borrowed(_) => text,
        Cow::Owned(replaced) => replaced,
    }
}

pub fn count_words(content: &str) -> u64 {
    strip_latex(content).split_whitespace().count() as u64
}

/// Invalid UTF-8 is decoded lossily.
pub fn count_words_bytes(content: &[u8]) -> u64 {
    count_words(&String::from_utf8_lossy(content))
}
