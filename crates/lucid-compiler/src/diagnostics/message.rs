use std::fmt;

use crate::span::Span;

/// Diagnostic kinds, grouped by the pipeline stage that reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Parser: structure
    UnclosedGroup,
    UnmatchedParen,
    ExpectedExpression,
    ExpectedColon,
    ExpectedValue,
    ExpectedNumber,
    MalformedRange,
    UnexpectedToken,
    ModifierIgnored,
    UnbalancedStacks,

    // Typer: fields
    MissingField,
    UnknownField,

    // Typer: values
    TypeMismatch,
    InvalidNumber,
    InvalidDateTime,
    InvalidIp,
    InvalidCidr,
    EmptyRegex,
    InvalidRegex,
    ProximityNotAllowed,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::ModifierIgnored => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Hint attached when the call site provides none.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExpectedColon => Some("e.g., `level:42`"),
            Self::MalformedRange => Some("e.g., `[1 TO 5]` or `{* TO 10]`"),
            Self::MissingField => Some("prefix the value with a field, e.g., `message:\"text\"`"),
            Self::InvalidDateTime => {
                Some("use RFC 3339, unix seconds, or a layout declared in the schema")
            }
            Self::InvalidCidr => Some("e.g., `\"10.0.0.0/8\"`"),
            Self::UnbalancedStacks => Some("this is a bug in the parser"),
            _ => None,
        }
    }

    /// Base message for this kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedGroup => "missing closing `)`",
            Self::UnmatchedParen => "unmatched `)`",
            Self::ExpectedExpression => "expected an expression",
            Self::ExpectedColon => "expected `:` after field name",
            Self::ExpectedValue => "expected a value",
            Self::ExpectedNumber => "expected a number",
            Self::MalformedRange => "malformed range",
            Self::UnexpectedToken => "unexpected token",
            Self::ModifierIgnored => "modifier has no effect here",
            Self::UnbalancedStacks => "unbalanced parser stacks",

            Self::MissingField => "value has no field",
            Self::UnknownField => "unknown field",

            Self::TypeMismatch => "type mismatch",
            Self::InvalidNumber => "invalid number",
            Self::InvalidDateTime => "invalid datetime",
            Self::InvalidIp => "invalid IP address",
            Self::InvalidCidr => "invalid network prefix",
            Self::EmptyRegex => "empty regex pattern",
            Self::InvalidRegex => "invalid regex",
            Self::ProximityNotAllowed => "proximity requires a text field",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnknownField => "`{}` is not a known field".to_string(),
            Self::InvalidNumber => "`{}` is not a valid number".to_string(),
            Self::InvalidDateTime => "`{}` is not a valid datetime".to_string(),
            Self::InvalidIp => "`{}` is not a valid IP address".to_string(),
            Self::TypeMismatch => "{}".to_string(),
            Self::UnexpectedToken => "unexpected {}".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One reported problem: message, span, optional hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    pub(crate) span: Span,
    pub(crate) message: String,
    pub(crate) hint: Option<String>,
}

impl Diagnostic {
    pub(crate) fn with_default_message(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            kind,
            span,
            message: kind.fallback_message().to_string(),
            hint: kind.default_hint().map(str::to_string),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

/// Plain form: `<start>-<end>: <message> [<hint>]`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " [{hint}]")?;
        }
        Ok(())
    }
}
