/// Which backend adapter the chat session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Proxy,
    Direct,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Proxy => "proxy",
            BackendKind::Direct => "direct",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "proxy" => Some(BackendKind::Proxy),
            "direct" => Some(BackendKind::Direct),
            _ => None,
        }
    }

    pub fn all() -> Vec<BackendKind> {
        vec![BackendKind::Proxy, BackendKind::Direct]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Proxy => "Harbor Watch proxy",
            BackendKind::Direct => "Direct inference",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!(BackendKind::from_str("Proxy"), Some(BackendKind::Proxy));
        assert_eq!(BackendKind::from_str(" direct "), Some(BackendKind::Direct));
        assert_eq!(BackendKind::from_str("groq"), None);
        for kind in BackendKind::all() {
            assert_eq!(BackendKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
