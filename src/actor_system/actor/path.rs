//! Actor path - unique identifier for registered actors.

use std::fmt::{Error, Formatter};

/// Unique identifier for registered actors, e.g. `/pong/user/ponger`.
#[derive(Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ActorPath(Vec<String>);

impl ActorPath {
    /// Last segment of the path, the actor's own name.
    pub fn key(&self) -> String {
        self.0.last().cloned().unwrap_or_default()
    }

    pub fn level(&self) -> usize {
        self.0.len()
    }
}

impl From<&str> for ActorPath {
    fn from(str: &str) -> Self {
        let tokens: Vec<String> = str
            .split('/')
            .filter(|x| !x.trim().is_empty())
            .map(|s| s.to_string())
            .collect();
        ActorPath(tokens)
    }
}

impl From<String> for ActorPath {
    fn from(string: String) -> Self {
        ActorPath::from(string.as_str())
    }
}

impl std::ops::Div<&str> for ActorPath {
    type Output = ActorPath;

    fn div(self, rhs: &str) -> Self::Output {
        let mut keys = self.0;
        keys.push(rhs.to_string());
        ActorPath(keys)
    }
}

impl std::fmt::Display for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "/{}", self.0.join("/"))
    }
}

impl std::fmt::Debug for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_empty_segments() {
        let path = ActorPath::from("//pong/user//ponger/");
        assert_eq!(path.level(), 3);
        assert_eq!(path.key(), "ponger");
        assert_eq!(path.to_string(), "/pong/user/ponger");
    }

    #[test]
    fn test_div_appends_segment() {
        let path = ActorPath::from("/pong") / "user" / "ponger";
        assert_eq!(path, ActorPath::from("/pong/user/ponger"));
    }

    #[test]
    fn test_empty_path_displays_root() {
        let path = ActorPath::from("");
        assert_eq!(path.level(), 0);
        assert_eq!(path.key(), "");
        assert_eq!(format!("{path:?}"), "/");
    }
}
