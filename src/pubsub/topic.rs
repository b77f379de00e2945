use std::{fmt, sync::Arc};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::SubscribeError;

/// Шаблон топика. Всегда сопоставляется со всей строкой топика, а не
/// с подстрокой.
#[derive(Clone)]
pub enum TopicPattern {
    /// Регулярное выражение, заякоренное с обеих сторон.
    Regex { source: Arc<str>, regex: Regex },
    /// Glob-шаблон, например `"sensor.*"` или `"a?c"`.
    Glob { source: Arc<str>, matcher: GlobMatcher },
}

impl TopicPattern {
    /// Компилирует регулярное выражение. `".*_topic"` совпадёт с
    /// `"foo_topic"`, но не с `"foo_topic_2"`.
    pub fn regex(source: &str) -> Result<Self, SubscribeError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            SubscribeError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::Regex {
            source: Arc::from(source),
            regex,
        })
    }

    /// Компилирует glob-шаблон.
    pub fn glob(source: &str) -> Result<Self, SubscribeError> {
        let matcher = Glob::new(source)
            .map_err(|e| SubscribeError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?
            .compile_matcher();
        Ok(Self::Glob {
            source: Arc::from(source),
            matcher,
        })
    }

    pub fn is_match(
        &self,
        topic: &str,
    ) -> bool {
        match self {
            Self::Regex { regex, .. } => regex.is_match(topic),
            Self::Glob { matcher, .. } => matcher.is_match(topic),
        }
    }

    /// Исходный текст шаблона.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Regex { source, .. } | Self::Glob { source, .. } => source,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Regex { .. } => "regex",
            Self::Glob { .. } => "glob",
        }
    }
}

// Скомпилированные шаблоны сравниваются по виду и исходному тексту.
impl PartialEq for TopicPattern {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.kind() == other.kind() && self.as_str() == other.as_str()
    }
}

impl Eq for TopicPattern {}

impl fmt::Debug for TopicPattern {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "TopicPattern::{}({:?})", self.kind(), self.as_str())
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.as_str())
    }
}

/// Ключ подписки: точное имя топика или шаблон.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicKey {
    Exact(Arc<str>),
    Pattern(TopicPattern),
}

impl TopicKey {
    pub fn exact(topic: impl AsRef<str>) -> Self {
        Self::Exact(Arc::from(topic.as_ref()))
    }

    pub fn regex(source: &str) -> Result<Self, SubscribeError> {
        TopicPattern::regex(source).map(Self::Pattern)
    }

    pub fn glob(source: &str) -> Result<Self, SubscribeError> {
        TopicPattern::glob(source).map(Self::Pattern)
    }

    /// Совпадает ли опубликованный топик с ключом.
    pub fn matches(
        &self,
        topic: &str,
    ) -> bool {
        match self {
            Self::Exact(name) => &**name == topic,
            Self::Pattern(pattern) => pattern.is_match(topic),
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern(_))
    }
}

impl fmt::Display for TopicKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Exact(name) => f.write_str(name),
            Self::Pattern(pattern) => write!(f, "{pattern}"),
        }
    }
}

impl From<&str> for TopicKey {
    fn from(topic: &str) -> Self {
        Self::exact(topic)
    }
}

impl From<String> for TopicKey {
    fn from(topic: String) -> Self {
        Self::Exact(Arc::from(topic))
    }
}

impl From<&String> for TopicKey {
    fn from(topic: &String) -> Self {
        Self::exact(topic)
    }
}

impl From<TopicPattern> for TopicKey {
    fn from(pattern: TopicPattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<&TopicKey> for TopicKey {
    fn from(key: &TopicKey) -> Self {
        key.clone()
    }
}
