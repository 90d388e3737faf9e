/// What a click on the map does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditorMode {
    #[default]
    Select,
    CreateAgent,
    CreateAccount,
    Erase,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorMode::Select => "select",
            EditorMode::CreateAgent => "agent",
            EditorMode::CreateAccount => "account",
            EditorMode::Erase => "erase",
        }
    }
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EditorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "select" | "sel" => Ok(EditorMode::Select),
            "agent" | "create-agent" => Ok(EditorMode::CreateAgent),
            "account" | "create-account" => Ok(EditorMode::CreateAccount),
            "erase" | "delete" => Ok(EditorMode::Erase),
            other => Err(format!(
                "unknown mode '{}' (expected select, agent, account or erase)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("Agent".parse::<EditorMode>(), Ok(EditorMode::CreateAgent));
        assert_eq!("erase".parse::<EditorMode>(), Ok(EditorMode::Erase));
        assert!("move".parse::<EditorMode>().is_err());
        assert_eq!(EditorMode::default(), EditorMode::Select);
    }
}
